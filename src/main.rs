use twit::cli::SilentExit;
use twit::ui::output;

fn main() {
    if let Err(err) = twit::cli::run() {
        if let Some(SilentExit(code)) = err.downcast_ref::<SilentExit>() {
            std::process::exit(*code);
        }
        output::error(format!("{:#}", err));
        std::process::exit(1);
    }
}
