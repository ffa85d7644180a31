use clap::Parser;
use faxc_drv::Cli;

fn main() {
    let cli = Cli::parse();
    faxc_drv::init_tracing(cli.verbose);

    match faxc_drv::run(&cli) {
        Ok((handler, exit_code)) => {
            faxc_drv::report(&handler);
            std::process::exit(exit_code);
        }
        Err(err) => {
            eprintln!("\u{2716} {err}");
            std::process::exit(2);
        }
    }
}
