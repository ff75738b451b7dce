use ringmon_core::settings;

/// Creates `~/.config/ringmon/settings.toml` with comments explaining
/// every option. An existing file is not overwritten.
pub fn execute() {
    let Some(dir) = settings::config_dir() else {
        eprintln!("Error: could not determine home directory.");
        std::process::exit(1);
    };

    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Error: could not create {}: {e}", dir.display());
        std::process::exit(1);
    }

    write_if_missing(
        &dir.join("settings.toml"),
        &settings::template::generate_settings(),
    );

    println!("\nEdit this file to change the threshold, size, timings and colors.");
    println!("Changes apply the next time the gadget starts.");
}

/// Writes content to a file only if it doesn't already exist.
fn write_if_missing(path: &std::path::Path, content: &str) {
    if path.exists() {
        println!("Already exists: {}", path.display());
        return;
    }

    match std::fs::write(path, content) {
        Ok(()) => println!("Created {}", path.display()),
        Err(e) => eprintln!("Error: could not write {}: {e}", path.display()),
    }
}
