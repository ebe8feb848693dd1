use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};
use glam::DVec3;

pub mod core;
pub mod error;
pub mod obj;

pub use crate::core::{Camera, Canvas, Face, Hit, Mesh};
pub use error::{Result, TraceError};

/// Default viewpoint when `--camera` is not given.
pub const DEFAULT_CAMERA: DVec3 = DVec3::new(4.0, 4.0, 4.0);

/// Fixed canvas used when debugging off-terminal (matches `--size 22x150`).
pub const DEBUG_CANVAS: (u16, u16) = (22, 150);

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub model: PathBuf,
    pub spin: bool,
    /// Per-frame rotation in radians when spinning.
    pub step: f64,
    /// rows x cols override; `None` means ask the terminal.
    pub size: Option<(u16, u16)>,
    pub camera: DVec3,
    pub export: Option<PathBuf>,
}

pub fn create_clap_command() -> Command {
    Command::new("termtrace")
        .about("ASCII ray tracer for OBJ models")
        .version("0.2")
        .arg(
            Arg::new("model")
                .value_name("FILE")
                .help("Path to the .obj model to render")
                .required(true),
        )
        .arg(
            Arg::new("spin")
                .short('s')
                .long("spin")
                .action(ArgAction::SetTrue)
                .help("Animate the model spinning around the z-axis (q or Esc to quit)"),
        )
        .arg(
            Arg::new("step")
                .long("step")
                .value_name("RADIANS")
                .default_value("0.05")
                .help("Rotation per frame in spin mode"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .value_name("ROWSxCOLS")
                .help("Fixed canvas size instead of the terminal size (e.g. 22x150)"),
        )
        .arg(
            Arg::new("camera")
                .short('c')
                .long("camera")
                .value_name("X,Y,Z")
                .help("Camera origin (default 4,4,4); the camera always looks at the origin"),
        )
        .arg(
            Arg::new("export")
                .short('e')
                .long("export")
                .value_name("FILE")
                .help("Write the loaded mesh back out as OBJ"),
        )
}

pub fn handle_clap_matches(matches: &clap::ArgMatches) -> Result<RenderOptions> {
    // "model" is required, so clap guarantees it is present.
    let model = matches
        .get_one::<String>("model")
        .map(PathBuf::from)
        .unwrap_or_default();

    let step = matches
        .get_one::<String>("step")
        .map(|s| parse_step(s))
        .transpose()?
        .unwrap_or(0.05);

    let size = matches
        .get_one::<String>("size")
        .map(|s| parse_size(s))
        .transpose()?;

    let camera = matches
        .get_one::<String>("camera")
        .map(|s| parse_vec3(s))
        .transpose()?
        .unwrap_or(DEFAULT_CAMERA);
    // The view basis projects world z out of the forward direction, so an
    // origin on the z-axis (zero included) leaves it undefined.
    if camera.x.abs() < 1e-12 && camera.y.abs() < 1e-12 {
        return Err(TraceError::InvalidArg(format!(
            "camera origin {camera} lies on the z-axis; the view basis is undefined there"
        )));
    }

    Ok(RenderOptions {
        model,
        spin: matches.get_flag("spin"),
        step,
        size,
        camera,
        export: matches.get_one::<String>("export").map(PathBuf::from),
    })
}

fn parse_step(s: &str) -> Result<f64> {
    s.parse()
        .map_err(|_| TraceError::InvalidArg(format!("bad step '{s}'")))
}

fn parse_size(s: &str) -> Result<(u16, u16)> {
    let err = || TraceError::InvalidArg(format!("bad size '{s}', expected ROWSxCOLS"));
    let (rows, cols) = s.split_once(['x', 'X']).ok_or_else(err)?;
    Ok((
        rows.trim().parse().map_err(|_| err())?,
        cols.trim().parse().map_err(|_| err())?,
    ))
}

fn parse_vec3(s: &str) -> Result<DVec3> {
    let err = || TraceError::InvalidArg(format!("bad camera '{s}', expected X,Y,Z"));
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse().map_err(|_| err()))
        .collect::<Result<_>>()?;
    if parts.len() != 3 {
        return Err(err());
    }
    Ok(DVec3::new(parts[0], parts[1], parts[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_size_argument() {
        assert_eq!(parse_size("22x150").unwrap(), (22, 150));
        assert_eq!(parse_size("40X100").unwrap(), (40, 100));
        assert!(parse_size("22").is_err());
        assert!(parse_size("ax9").is_err());
    }

    #[test]
    fn parses_camera_argument() {
        assert_eq!(parse_vec3("4,4,4").unwrap(), DVec3::new(4.0, 4.0, 4.0));
        assert_eq!(
            parse_vec3("0, -2.5, 10").unwrap(),
            DVec3::new(0.0, -2.5, 10.0)
        );
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,2,three").is_err());
    }

    #[test]
    fn z_axis_camera_origins_are_rejected() {
        for bad in ["0,0,5", "0,0,0", "0,0,-3"] {
            let matches = create_clap_command()
                .get_matches_from(["termtrace", "cube.obj", "--camera", bad]);
            assert!(
                handle_clap_matches(&matches).is_err(),
                "camera {bad} must be rejected"
            );
        }
        // Off-axis origins stay valid.
        let matches =
            create_clap_command().get_matches_from(["termtrace", "cube.obj", "--camera", "0,1,5"]);
        assert!(handle_clap_matches(&matches).is_ok());
    }

    #[test]
    fn clap_matches_produce_options() {
        let matches = create_clap_command().get_matches_from([
            "termtrace",
            "cube.obj",
            "--spin",
            "--size",
            "22x150",
            "--camera",
            "1,2,3",
        ]);
        let opts = handle_clap_matches(&matches).unwrap();
        assert_eq!(opts.model, PathBuf::from("cube.obj"));
        assert!(opts.spin);
        assert_eq!(opts.size, Some((22, 150)));
        assert_eq!(opts.camera, DVec3::new(1.0, 2.0, 3.0));
        assert!(opts.export.is_none());
        assert!((opts.step - 0.05).abs() < 1e-12);
    }
}
