use std::process::ExitCode;

use sparse_conformance::{
    run_suite, BackendKind, HarnessConfig, HarnessError, HostBackend, Report, WgpuBackend,
};

fn run(config: &HarnessConfig) -> Result<Report, HarnessError> {
    Ok(match config.backend {
        BackendKind::Host => run_suite(&HostBackend::new(), config),
        BackendKind::Wgpu => run_suite(&WgpuBackend::new()?, config),
    })
}

fn main() -> ExitCode {
    env_logger::init();
    let report = match HarnessConfig::from_env().and_then(|config| {
        log::info!("{:?}", config);
        run(&config)
    }) {
        Ok(report) => report,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err);
            return ExitCode::from(2);
        }
    };

    println!("{}", report);
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
