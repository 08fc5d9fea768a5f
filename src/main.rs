fn main() {
    if handle_cli_flags() {
        return;
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = feedsift::app::dispatch(&args) {
        if err.downcast_ref::<feedsift::app::UsageError>().is_some() {
            eprintln!("error: {err}");
            eprintln!("Run `feedsift --help` for usage.");
            std::process::exit(2);
        }
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn handle_cli_flags() -> bool {
    let mut saw_flag = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("feedsift {}", feedsift::VERSION);
                saw_flag = true;
            }
            "--help" | "-h" => {
                println!(
                    "feedsift — keyword filtering for social feeds.\n\nUsage: feedsift [COMMAND]\n\nCommands:\n  demo                 Filter a sample feed with the saved keywords (default)\n  add <keyword>        Save a keyword (trimmed, lowercased; duplicates ignored)\n  remove <keyword>     Delete a keyword (case-insensitive; idempotent)\n  list                 Print saved keywords in insertion order\n\nFlags:\n  --version, -V        Show version and exit\n  --help,    -h        Show this help message"
                );
                saw_flag = true;
            }
            _ => {}
        }
    }
    saw_flag
}
