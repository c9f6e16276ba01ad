//! Zone classification command.

use clap::Args;
use colored::Colorize;

use crate::cli::output;
use crate::error::VeilError;
use crate::menubar::zone::classification_margin;
use crate::menubar::{Zone, ZoneBoundaries};

/// Arguments for `veil classify`.
#[derive(Args, Debug)]
#[command(after_long_help = r#"Examples:
  veil classify --x 450 --width 22 --separator 600
  veil classify --x 120 --width 8 --separator 600 --always-hidden 300 --json"#)]
pub struct ClassifyArgs {
    /// Left edge of the icon.
    #[arg(long, allow_hyphen_values = true)]
    pub x: f64,

    /// Width of the icon.
    #[arg(long)]
    pub width: f64,

    /// Left edge of the separator.
    #[arg(long, allow_hyphen_values = true)]
    pub separator: f64,

    /// Left edge of the always-hidden separator, when that zone is enabled.
    #[arg(long, value_name = "X", allow_hyphen_values = true)]
    pub always_hidden: Option<f64>,

    /// Output in JSON format.
    #[arg(long, short)]
    pub json: bool,
}

/// Execute the classify command.
///
/// # Errors
///
/// Returns an error for a non-positive width or markers in the wrong order.
pub fn execute(args: &ClassifyArgs) -> Result<(), VeilError> {
    let zone = classify(args)?;
    let margin = classification_margin(args.width);

    if args.json {
        output::print_highlighted_json(&serde_json::json!({
            "zone": zone,
            "midpoint": args.x + args.width / 2.0,
            "margin": margin,
        }));
    } else {
        let label = match zone {
            Zone::Visible => zone.to_string().green(),
            Zone::Hidden => zone.to_string().yellow(),
            Zone::AlwaysHidden => zone.to_string().red(),
        };
        println!("{label} {}", format!("(margin {margin:.1})").dimmed());
    }
    Ok(())
}

fn classify(args: &ClassifyArgs) -> Result<Zone, VeilError> {
    if !args.width.is_finite() || args.width <= 0.0 {
        return Err(VeilError::InvalidArguments("--width must be positive".to_string()));
    }
    if args.always_hidden.is_some_and(|x| x >= args.separator) {
        return Err(VeilError::InvalidArguments(
            "--always-hidden must be left of --separator".to_string(),
        ));
    }

    let bounds = ZoneBoundaries {
        separator_x: args.separator,
        always_hidden_x: args.always_hidden,
    };
    Ok(bounds.classify_span(args.x, args.width))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(x: f64, width: f64, always_hidden: Option<f64>) -> ClassifyArgs {
        ClassifyArgs { x, width, separator: 600.0, always_hidden, json: false }
    }

    #[test]
    fn test_classify_zones() {
        assert_eq!(classify(&args(700.0, 22.0, Some(300.0))).unwrap(), Zone::Visible);
        assert_eq!(classify(&args(450.0, 22.0, Some(300.0))).unwrap(), Zone::Hidden);
        assert_eq!(classify(&args(100.0, 22.0, Some(300.0))).unwrap(), Zone::AlwaysHidden);
        assert_eq!(classify(&args(100.0, 22.0, None)).unwrap(), Zone::Hidden);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(classify(&args(100.0, 0.0, None)).is_err());
        assert!(classify(&args(100.0, 22.0, Some(650.0))).is_err());
    }
}
