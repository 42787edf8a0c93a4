use std::process::ExitCode;

fn main() -> ExitCode {
    lang_select::init();

    match lang_select::ui::cli::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
