use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Gate credentials and marketplace tokens live in the database, so none of these are secret
    const DISPLAY_ENVS: [&str; 22] = [
        "RUST_LOG",
        "RECON_HOST",
        "RECON_PORT",
        "RECON_DATABASE_URL",
        "RECON_GATE_URL",
        "RECON_GATE_USER_AGENT",
        "RECON_GATE_MAX_PAGES",
        "RECON_GATE_PAGE_DELAY_MS",
        "RECON_GATE_TIMEOUT_SECS",
        "RECON_MARKETPLACE_URL",
        "RECON_ORDERS_URL",
        "RECON_MARKETPLACE_TIMEOUT_SECS",
        "RECON_POLL_INTERVAL_SECS",
        "RECON_MATCH_INTERVAL_SECS",
        "RECON_TOKEN_INTERVAL_SECS",
        "RECON_USER_DELAY_MS",
        "RECON_MATCH_LOOKBACK_DAYS",
        "RECON_MATCH_WINDOW_MINS",
        "RECON_MATCH_CURRENCY",
        "RECON_ENABLE_MATCHING_WORKER",
        "RECON_ENABLE_TOKEN_WORKER",
        "RECON_RUN_MIGRATIONS",
    ];

    println!("Current environment values:");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
