//! Shared CLI helpers — path expansion, response printing, status markers.

use std::path::PathBuf;

use colored::Colorize;
use modelgate_core::utils::mask_secret;
use modelgate_core::ModelResponse;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print a model response to stdout, followed by a usage line.
pub fn print_response(response: &ModelResponse) {
    println!();
    println!(
        "{} {}",
        response.friendly_name.cyan().bold(),
        format!("({})", response.model_name).dimmed()
    );
    if response.content.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{}", response.content);
    }
    if let Some(usage) = &response.usage {
        println!(
            "{}",
            format!(
                "tokens: {} in / {} out / {} total",
                usage.input_tokens, usage.output_tokens, usage.total_tokens
            )
            .dimmed()
        );
    }
    println!();
}

/// `✓ (key ****abcd)` or `· not configured`.
pub fn key_status(api_key: &str) -> String {
    if api_key.is_empty() {
        format!("{}", "· not configured".dimmed())
    } else {
        format!("{} (key {})", "✓".green(), mask_secret(api_key))
    }
}

/// API key as shown in listings; empty keys read as "inherit".
pub fn display_key(api_key: &str) -> String {
    if api_key.is_empty() {
        "(inherit)".to_string()
    } else {
        mask_secret(api_key)
    }
}

/// Print a "thinking" placeholder while a request is in flight.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_home() {
        let result = expand_tilde("~/foo/bar");
        assert!(result.ends_with("foo/bar"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn expand_tilde_no_tilde() {
        let result = expand_tilde("/absolute/path");
        assert_eq!(result, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn display_key_masks() {
        assert_eq!(display_key(""), "(inherit)");
        assert_eq!(display_key("sk-1234567890"), "*********7890");
    }

    #[test]
    fn key_status_mentions_tail_only() {
        colored::control::set_override(false);
        assert_eq!(key_status(""), "· not configured");
        assert_eq!(key_status("sk-abcdefghij"), "✓ (key *********ghij)");
    }
}
