//! Kinetic speedometer simulator for desktop.
//!
//! Replays a simulated drive through the speedometer core and shows the
//! energy gauge above the speed/energy/acceleration chart, using the
//! embedded-graphics-simulator crate.
//!
//! # Usage
//!
//! ```text
//! speedo-sim [--config <path> | <path>]
//! ```
//!
//! # Keys
//!
//! - `P`: pause / resume the session
//! - `R`: restart the session (clears the chart and the odometer)

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]

use std::env;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use kinetic_speedometer::location::DriveProfile;
use kinetic_speedometer::{Result, Session, SpeedoConfig};
use speedo_common::channels::ChannelTable;
use speedo_common::colors::BLACK;
use speedo_common::kinematics::format_odometer;
use speedo_common::needle::NeedleAnimator;
use speedo_common::render::{RenderContext, RenderState};
use speedo_common::ticks::NickMap;
use speedo_common::widgets::{GaugeReadout, draw_chart, draw_gauge};

/// Target frame time (~50 FPS). The main loop sleeps if the frame completes early.
const FRAME_TIME: Duration = Duration::from_millis(20);

const SCREEN_WIDTH: u32 = 320;
const GAUGE_HEIGHT: u32 = 320;
const CHART_HEIGHT: u32 = 160;
const SCREEN_HEIGHT: u32 = GAUGE_HEIGHT + CHART_HEIGHT;

/// Pixels per dp on the simulated screen.
const DENSITY: f32 = 1.0;

/// Parse the config path from command line arguments.
///
/// Supports `speedo-sim <path>`, `speedo-sim --config <path>` and
/// `speedo-sim -c <path>`. No path means built-in defaults.
fn parse_config_path() -> Option<PathBuf> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
    }

    args.get(1).filter(|arg| !arg.starts_with('-')).map(PathBuf::from)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SpeedoConfig::load(parse_config_path().as_deref())?;
    config.log_diagnostics();

    // Setup-time scale data
    let scale = config.scale();
    let nicks = NickMap::build(&scale);
    let channels = ChannelTable::new();
    let mut needle = NeedleAnimator::with_tuning(&scale, config.needle_step_factor, config.render_min_interval_ms);

    let mut session = Session::new(&config, DriveProfile::city_loop());
    session.resume()?;

    let mut display: SimulatorDisplay<Rgb565> = SimulatorDisplay::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    let mut window = Window::new("Kinetic Speedometer", &output_settings);

    let gauge_ctx = RenderContext::new(Point::zero(), SCREEN_WIDTH, GAUGE_HEIGHT, DENSITY);
    let chart_ctx = RenderContext::new(Point::new(0, GAUGE_HEIGHT as i32), SCREEN_WIDTH, CHART_HEIGHT, DENSITY);
    let chart_area = Rectangle::new(chart_ctx.origin, chart_ctx.size());

    let mut render_state = RenderState::new();
    let started = Instant::now();

    display.clear(BLACK).ok();
    window.update(&display);

    loop {
        let frame_start = Instant::now();

        // Handle events
        for ev in window.events() {
            match ev {
                SimulatorEvent::Quit => {
                    session.pause();
                    return Ok(());
                }
                SimulatorEvent::KeyDown { keycode, repeat, .. } => {
                    if repeat {
                        continue;
                    }
                    match keycode {
                        Keycode::P => {
                            if session.is_running() {
                                session.pause();
                            } else {
                                session.resume()?;
                            }
                        }
                        Keycode::R => {
                            session.restart()?;
                            needle.set_value(scale.min_value);
                            render_state.mark_display_cleared();
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        if render_state.need_background() {
            display.clear(BLACK).ok();
        }

        // Needle follows the latest published energy
        let readout = session.readout();
        let now_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        needle.move_to_value(readout.energy_j);
        needle.step(now_ms);
        let needle_degrees = needle.needle_degrees();

        if render_state.check_gauge_dirty(needle_degrees, readout.speed_kmh, readout.energy_j) {
            let odometer = format_odometer(readout.odometer_m / 1000.0);
            draw_gauge(
                &mut display,
                &gauge_ctx,
                &scale,
                &nicks,
                &channels,
                needle_degrees,
                &GaugeReadout {
                    speed_kmh: readout.speed_kmh,
                    energy_j: readout.energy_j,
                },
                Some(odometer.as_str()),
            );
        }

        {
            let chart = session.chart().lock();
            let latest_ms = chart.latest().map_or(0.0, |row| row.time_ms);
            if render_state.check_chart_dirty(chart.len(), latest_ms) {
                chart_area
                    .into_styled(PrimitiveStyle::with_fill(BLACK))
                    .draw(&mut display)
                    .ok();
                draw_chart(&mut display, &chart_ctx, &**chart, &channels);
            }
        }

        render_state.end_frame();
        window.update(&display);

        // Frame rate limiting
        if let Some(remaining) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }
}
