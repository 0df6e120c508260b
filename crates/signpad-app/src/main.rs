//! Native entry point: replay a draw script and export once.
//!
//! Usage: `signpad <script.json> [output-dir]`

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    use signpad_app::{DirectorySink, DrawScript};
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(script_path) = args.next().map(PathBuf::from) else {
        eprintln!("Usage: signpad <script.json> [output-dir]");
        return ExitCode::from(2);
    };
    let output_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    log::info!("Starting Signpad with {}", script_path.display());

    let base_dir = script_path.parent().unwrap_or(Path::new(".")).to_path_buf();
    let session = match DrawScript::load(&script_path)
        .and_then(|script| script.build_session(&base_dir))
    {
        Ok(session) => session,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut sink = DirectorySink::new(output_dir);
    let notice = pollster::block_on(session.export(&mut sink));
    if notice.is_error() {
        log::error!("{}", notice.message);
        return ExitCode::FAILURE;
    }

    log::info!("{}", notice.message);
    for path in sink.written() {
        println!("{}", path.display());
    }
    ExitCode::SUCCESS
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
