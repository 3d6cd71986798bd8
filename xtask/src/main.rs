/// Bundles the plugin through nih_plug_xtask. Usage:
///
///   cargo xtask bundle circular-delay --release
///
/// The bundles land in `target/bundled/` as `Circular Delay.vst3` and
/// `Circular Delay.clap`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
