use clap::Parser;
use image::Rgb;
use logo_qr::docs::DEFAULT_IMAGE_SIZE_PT;
use std::path::PathBuf;

/// Parse `#rrggbb` (the `#` is optional).
pub fn parse_hex_color(hex: &str) -> Result<Rgb<u8>, String> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("Invalid hex color: {hex}"));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(|e| format!("Invalid hex color {hex}: {e}"))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

#[derive(Parser)]
#[command(name = "logo-qr")]
#[command(about = "Generate QR codes with a round logo in the centre, optionally placed in a new document")]
pub struct Args {
    /// Text to encode in the QR code
    #[arg(short, long)]
    pub text: String,

    /// Logo image path
    #[arg(short, long)]
    pub logo: Option<PathBuf>,

    /// Output image path
    #[arg(short, long, default_value = "qr_code.png")]
    pub output: PathBuf,

    /// Logo size as a fraction of the QR image (default: 0.25)
    #[arg(short, long, default_value = "0.25")]
    pub ratio: f32,

    /// Pixels per QR module (default: 10)
    #[arg(short, long, default_value = "10")]
    pub box_size: u32,

    /// Quiet zone width in modules (default: 4)
    #[arg(long, default_value = "4")]
    pub border: u32,

    /// Module color
    #[arg(long, default_value = "#000000", value_parser = parse_hex_color)]
    pub dark: Rgb<u8>,

    /// Background color
    #[arg(long, default_value = "#ffffff", value_parser = parse_hex_color)]
    pub light: Rgb<u8>,

    /// Create a new document holding the QR code
    #[arg(long)]
    pub upload: bool,

    /// OAuth access token for the drive and documents APIs
    #[arg(long, env = "LOGO_QR_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// E-mail address given writer access to the new document
    #[arg(long, env = "LOGO_QR_SHARE_WITH")]
    pub share_with: Option<String>,

    /// Document title (default: "QR code for <text>")
    #[arg(long)]
    pub title: Option<String>,

    /// Edge length of the inserted image in points (default: 300)
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE_PT)]
    pub image_size_pt: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#ff8000"), Ok(Rgb([255, 128, 0])));
        assert_eq!(parse_hex_color("0a0B0c"), Ok(Rgb([10, 11, 12])));
    }

    #[test]
    fn rejects_bad_hex_colors() {
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
        assert!(parse_hex_color("#ff00ff00").is_err());
        assert!(parse_hex_color("+f+f+f").is_err());
        assert!(parse_hex_color("#-1ff00").is_err());
    }

    #[test]
    fn defaults_match_the_library() {
        let args = Args::parse_from(["logo-qr", "--text", "https://example.org"]);
        assert_eq!(args.ratio, 0.25);
        assert_eq!(args.box_size, 10);
        assert_eq!(args.border, 4);
        assert_eq!(args.dark, Rgb([0, 0, 0]));
        assert_eq!(args.light, Rgb([255, 255, 255]));
        assert!(args.logo.is_none());
        assert!(!args.upload);
    }
}
