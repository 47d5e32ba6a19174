// ============================================================================
// PixelFE CLI: headless editing via command-line arguments
// ============================================================================
//
// Usage examples:
//   pixelfe --new 16x16 --color "#FF0000" --stamp 3,3 --stamp 4,3 -o heart.png
//   pixelfe -i sprite.png --brush 3 --stamp 8,8 -o sprite.png
//   pixelfe -i sprite.png --zoom 10 --grid -o preview.png
//
// Each --stamp is its own stroke, exactly as if clicked in the editor.  The
// raw canvas is written unless --zoom > 1 or --grid asks for the composite.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pixelfe::canvas::{self, Color};
use pixelfe::components::colors;
use pixelfe::{CanvasController, EditorResult, EditorSettings, io};

/// PixelFE headless pixel editor.
#[derive(Parser, Debug)]
#[command(
    name = "pixelfe",
    about = "PixelFE headless pixel editor",
    long_about = "Create or open a pixel canvas, stamp cells with the brush and save\n\
                  the result as PNG without opening the GUI.\n\n\
                  Example:\n  \
                  pixelfe --new 16x16 --color \"#FF0000\" --stamp 3,3 -o out.png"
)]
pub struct CliArgs {
    /// Image to open.
    #[arg(short, long, value_name = "FILE", conflicts_with = "new")]
    pub input: Option<PathBuf>,

    /// Start from a blank white canvas of this size instead of a file.
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    pub new: Option<(i64, i64)>,

    /// Where to write the PNG (".png" is appended when missing).
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Brush colour, #RRGGBB or #RRGGBBAA.
    #[arg(short, long, default_value = "#000000", value_parser = parse_color)]
    pub color: Color,

    /// Brush size in cells.
    #[arg(short, long, default_value_t = 1)]
    pub brush: u32,

    /// Cell to stamp, as X,Y. Repeat for more strokes.
    #[arg(long = "stamp", value_name = "X,Y", value_parser = parse_point)]
    pub stamps: Vec<(u32, u32)>,

    /// Write the zoomed composite at this scale instead of the raw canvas.
    #[arg(short, long, default_value_t = 1)]
    pub zoom: u32,

    /// Overlay grid lines on the composite.
    #[arg(long)]
    pub grid: bool,

    /// Cells between grid lines.
    #[arg(long, default_value_t = 1, value_name = "N")]
    pub grid_cells: u32,

    /// Log progress to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        Self::has_cli_flag(std::env::args().skip(1))
    }

    fn has_cli_flag<I, S>(args: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        args.into_iter().any(|a| {
            let a = a.as_ref();
            a == "--input"
                || a == "--new"
                || a.starts_with("--input=")
                || a.starts_with("--new=")
                || (a.starts_with("-i") && !a.starts_with("--"))
        })
    }

    fn wants_composite(&self) -> bool {
        self.zoom > 1 || self.grid
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the headless edit and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    match run_inner(&args) {
        Ok(written) => {
            if args.verbose {
                println!("→ {}", written.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_inner(args: &CliArgs) -> EditorResult<PathBuf> {
    let settings = EditorSettings::load();
    let mut controller = CanvasController::with_settings(&settings)?;

    match (&args.input, args.new) {
        (Some(path), _) => controller.load_image(io::load_image(path)?)?,
        (None, Some((w, h))) => controller.new_canvas(w, h)?,
        // Without --new the start-up canvas from the settings is kept.
        (None, None) => {}
    }

    controller.clear_viewport();
    controller.set_color(args.color);
    let brush = controller.set_brush_size(args.brush);
    let zoom = controller.set_zoom(args.zoom);
    controller.set_grid_visible(args.grid);
    controller.set_grid_cell_size(args.grid_cells);

    let mut painted = 0;
    for &(x, y) in &args.stamps {
        let sx = (x as i64 * zoom as i64).min(i32::MAX as i64) as i32;
        let sy = (y as i64 * zoom as i64).min(i32::MAX as i64) as i32;
        match controller.pointer_down(sx, sy) {
            Some(_) => painted += 1,
            None => tracing::warn!("stamp {},{} is outside the canvas, skipped", x, y),
        }
        controller.pointer_up();
    }
    tracing::info!(
        "{} of {} stamps applied with brush {}",
        painted,
        args.stamps.len(),
        brush
    );

    let pixels = if args.wants_composite() {
        controller.render_composite()
    } else {
        controller.export_image()
    };
    io::save_png(&pixels, &args.output)
}

// ============================================================================
// Argument parsers
// ============================================================================

fn parse_size(s: &str) -> Result<(i64, i64), String> {
    canvas::parse_dimensions(s).map_err(|e| e.to_string())
}

fn parse_color(s: &str) -> Result<Color, String> {
    colors::parse_hex(s).map_err(|e| e.to_string())
}

fn parse_point(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x = x.trim().parse::<u32>().map_err(|e| format!("bad X in '{}': {}", s, e))?;
    let y = y.trim().parse::<u32>().map_err(|e| format!("bad Y in '{}': {}", s, e))?;
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn parses_arguments() {
        let args = CliArgs::try_parse_from([
            "pixelfe", "--new", "8x4", "--stamp", "1,2", "--stamp", "3, 0", "-c", "#00FF00",
            "-o", "out.png",
        ])
        .unwrap();
        assert_eq!(args.new, Some((8, 4)));
        assert_eq!(args.stamps, vec![(1, 2), (3, 0)]);
        assert_eq!(args.color, Rgba([0, 255, 0, 255]));
        assert!(!args.wants_composite());
    }

    #[test]
    fn input_and_new_conflict() {
        let parsed = CliArgs::try_parse_from([
            "pixelfe", "-i", "a.png", "--new", "8x8", "-o", "out.png",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn detects_cli_flags_in_every_spelling() {
        for args in [
            vec!["--new", "8x8"],
            vec!["--new=8x8"],
            vec!["--input", "a.png"],
            vec!["--input=a.png"],
            vec!["-i", "a.png"],
            vec!["-ia.png"],
            vec!["-o", "out.png", "--new=4x4"],
        ] {
            assert!(CliArgs::has_cli_flag(&args), "{:?}", args);
        }
        assert!(!CliArgs::has_cli_flag(Vec::<String>::new()));
        assert!(!CliArgs::has_cli_flag(["--newish", "--inputs"]));
    }

    #[test]
    fn equals_form_parses_like_separate_value() {
        let args = CliArgs::try_parse_from(["pixelfe", "--new=6x3", "-o", "out.png"]).unwrap();
        assert_eq!(args.new, Some((6, 3)));
    }

    #[test]
    fn failed_run_reports_failure_code() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs::try_parse_from([
            "pixelfe",
            "--input",
            dir.path().join("missing.png").to_str().unwrap(),
            "-o",
            dir.path().join("out.png").to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(run(args), ExitCode::FAILURE);
    }

    #[test]
    fn rejects_bad_points() {
        assert!(parse_point("3").is_err());
        assert!(parse_point("a,1").is_err());
        assert_eq!(parse_point("4,5").unwrap(), (4, 5));
    }

    #[test]
    fn stamps_new_canvas_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dot");
        let args = CliArgs::try_parse_from([
            "pixelfe",
            "--new",
            "4x4",
            "--brush",
            "3",
            "--stamp",
            "0,0",
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();

        let written = run_inner(&args).unwrap();
        let img = io::load_image(&written).unwrap();
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(*img.get_pixel(1, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(2, 2), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn zoom_writes_composite() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("preview.png");
        let args = CliArgs::try_parse_from([
            "pixelfe",
            "--new",
            "3x2",
            "--zoom",
            "5",
            "--grid",
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();

        let written = run_inner(&args).unwrap();
        assert_eq!(io::load_image(&written).unwrap().dimensions(), (15, 10));
    }
}
