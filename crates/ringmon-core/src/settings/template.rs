/// Generates the default `settings.toml` contents with explanatory comments.
///
/// Used by `ringmon init` to create a starter file users can edit.
pub fn generate_settings() -> String {
    r##"# ringmon settings
# Location: ~/.config/ringmon/settings.toml

# CPU percentage at or above which the gadget logs the processes most
# likely responsible. 0 turns the scan off.
cpu_threshold = 99

# Window size in pixels (48 to 512).
size = 120

# Milliseconds between CPU samples.
sample_interval_ms = 2500

# Milliseconds the inner "echo" ring lags behind the outer ring.
echo_delay_ms = 500

# Saved automatically a few seconds after the gadget is dragged.
# [position]
# x = 1740
# y = 830

[logging]
# Log attribution findings and errors to
# %LOCALAPPDATA%\ringmon\logs\<date>_ringmon.log.
enabled = true
# Minimum level: "debug", "verbose", "info", "success", "warning",
# "error" or "important".
level = "info"

# Ring colors. Set enabled = false for plain green/yellow/orange/red.
# Available: name = "catppuccin", flavor = mocha | macchiato | frappe | latte
[theme]
enabled = true
name = "catppuccin"
flavor = "mocha"
# Unfilled ring color (hex or named: red, maroon, peach, yellow, green,
# teal, sky, blue, mauve):
# track = "#313244"

# Override the [top, bottom] gradient of a tier:
# [theme.gradients]
# low = ["teal", "green"]
# extreme = ["red", "#d20f39"]

[scan]
# Skip processes that have used less CPU time than this in total.
min_cpu_time_secs = 3
# Milliseconds between the two CPU readings taken per process.
sample_spacing_ms = 1
"##
    .to_string()
}
