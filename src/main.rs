use liquid_gauge::{FrameSurface, Gauge, GaugeOptions, TICK_INTERVAL_MS};

use pixels::{Pixels, SurfaceTexture};
use std::env;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

/// Latest level piped in on stdin, scaled by 1000. u32::MAX means no value
/// has arrived yet.
static PIPE_LEVEL: AtomicU32 = AtomicU32::new(u32::MAX);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Parse --level x, --title s and --no-animate from the command line
    let mut level = liquid_gauge::DEFAULT_LEVEL;
    let mut window_title = "Liquid Gauge".to_string();
    let mut animate = true;
    let mut args = env::args().peekable();
    while let Some(arg) = args.next() {
        if arg == "--level" {
            if let Some(value) = args.next() {
                if let Ok(value) = value.parse::<f64>() {
                    level = value;
                }
            }
        } else if arg == "--title" {
            if let Some(title) = args.next() {
                window_title = title;
            }
        } else if arg == "--no-animate" {
            animate = false;
        }
    }

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(&window_title)
        .with_inner_size(LogicalSize::new(
            liquid_gauge::DEFAULT_WIDTH,
            liquid_gauge::DEFAULT_HEIGHT,
        ))
        .build(&event_loop)?;
    let window = std::sync::Arc::new(window);
    let window_clone = window.clone();

    let size = window.inner_size();
    let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

    let options = GaugeOptions::builder().level(level).build();
    let mut gauge = Gauge::attach(
        FrameSurface::new(size.width as usize, size.height as usize),
        options,
    )?;
    let mut tick_handle = gauge.render(animate);

    let tick_interval = Duration::from_millis(TICK_INTERVAL_MS);
    let mut last_tick = Instant::now();

    // Read level updates from stdin, one number per line
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            if let Ok(line) = line {
                if let Ok(value) = line.trim().parse::<f64>() {
                    let scaled = (value * 1000.0).round() as u32;
                    PIPE_LEVEL.store(scaled, Ordering::Relaxed);
                }
            }
        }
    });

    event_loop.run(move |event, window_target| {
        window_target.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    let _ = pixels.resize_buffer(new_size.width, new_size.height);
                    let _ = pixels.resize_surface(new_size.width, new_size.height);
                    gauge
                        .surface_mut()
                        .resize(new_size.width as usize, new_size.height as usize);
                    gauge
                        .set_width(new_size.width as f64)
                        .set_height(new_size.height as f64);
                    tick_handle = gauge.render(animate);
                }
                WindowEvent::RedrawRequested => {
                    let piped = PIPE_LEVEL.load(Ordering::Relaxed);
                    if piped != u32::MAX {
                        let piped_level = piped as f64 / 1000.0;
                        if (gauge.config().level - piped_level).abs() > f64::EPSILON {
                            gauge.set_level(piped_level);
                        }
                    }
                    if let Some(ref handle) = tick_handle {
                        gauge.tick(handle);
                    }
                    let src = gauge.surface().frame();
                    if pixels.frame_mut().len() == src.len() {
                        pixels.frame_mut().copy_from_slice(src);
                    }
                    let _ = pixels.render();
                }
                _ => {}
            },
            Event::AboutToWait => {
                // Pace redraws to the animation tick interval
                let elapsed = last_tick.elapsed();
                if elapsed < tick_interval {
                    thread::sleep(tick_interval - elapsed);
                }
                last_tick = Instant::now();
                window_clone.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
