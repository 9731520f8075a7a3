fn main() -> anyhow::Result<()> {
    lib_grid_host::init()
}
