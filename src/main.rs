use std::fs::File;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode},
    execute, queue,
    style::Print,
    terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use log::LevelFilter;
use simplelog::{Config, WriteLogger};
use termtrace::{obj, Camera, Canvas, Mesh, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Stdout is the render surface, so logs go to a file.
    if let Ok(file) = File::create("termtrace.log") {
        let _ = WriteLogger::init(LevelFilter::Info, Config::default(), file);
    }

    let matches = termtrace::create_clap_command().get_matches();
    let opts = termtrace::handle_clap_matches(&matches)?;

    let records = obj::load_path(&opts.model)?;
    let mut mesh = Mesh::from_records(records)?;
    mesh.centering();
    log::info!(
        "loaded {}: {} vertices, {} normals, {} faces",
        opts.model.display(),
        mesh.vertices.len(),
        mesh.normals.len(),
        mesh.faces.len()
    );

    if let Some(path) = &opts.export {
        mesh.write_obj(path)?;
    }

    let (rows, cols) = match opts.size {
        Some(size) => size,
        None => {
            // crossterm reports (cols, rows)
            let (cols, rows) = terminal::size()?;
            (rows, cols)
        }
    };
    let canvas = Canvas::new(rows, cols)?;
    let mut camera = Camera::new(opts.camera, canvas);

    if opts.spin {
        run_spin(&mut camera, &mut mesh, opts.step)
    } else {
        camera.ray_trace(&mesh);
        let mut stdout = io::stdout();
        write!(stdout, "{}", camera.canvas())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Rotate-render-display loop in the alternate screen, ~30 fps, until q/Esc.
fn run_spin(camera: &mut Camera, mesh: &mut Mesh, step: f64) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        Hide,
        Clear(ClearType::All)
    )?;

    let result = spin_loop(camera, mesh, step, &mut stdout);

    // Always restore the terminal, even if the loop errored.
    disable_raw_mode()?;
    execute!(stdout, Show, terminal::LeaveAlternateScreen)?;
    result
}

fn spin_loop(
    camera: &mut Camera,
    mesh: &mut Mesh,
    step: f64,
    stdout: &mut io::Stdout,
) -> Result<()> {
    let frame_duration = Duration::from_millis(33);
    let mut last_frame = Instant::now();

    loop {
        if event::poll(Duration::from_millis(1))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break,
                    _ => {}
                }
            }
        }

        let now = Instant::now();
        if now - last_frame >= frame_duration {
            mesh.rotate(step);
            camera.ray_trace(mesh);

            // Raw mode: address each row explicitly instead of relying on \n.
            for row in 0..camera.canvas().rows() {
                queue!(stdout, MoveTo(0, row as u16), Print(camera.canvas().line(row)))?;
            }
            stdout.flush()?;
            last_frame = now;
        }
    }
    Ok(())
}
