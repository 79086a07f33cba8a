use std::{
    error::Error,
    path::PathBuf,
    process::ExitCode,
    time::{Duration, Instant},
};

use chip_8_vm::{Chip8Builder, Chip8Color, Chip8Mode, KEY_COUNT, SCREEN_HEIGHT, SCREEN_WIDTH};
use clap::{Parser, ValueEnum};
use log::{error, info};
use sdl2::{
    event::Event,
    keyboard::Keycode,
    pixels::{Color, PixelFormatEnum},
};

mod keymap;
use keymap::keymap;

const WINDOW_TITLE: &str = "chip8-vm";

/// Delay and sound timers run at 60 Hz regardless of instruction rate
const TIMER_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / 60);

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Standard,
    CosmacVip,
    Chip48,
    SuperChip,
}

impl From<Mode> for Chip8Mode {
    fn from(mode: Mode) -> Chip8Mode {
        match mode {
            Mode::Standard => Chip8Mode::STANDARD,
            Mode::CosmacVip => Chip8Mode::COSMAC_VIP,
            Mode::Chip48 => Chip8Mode::CHIP_48,
            Mode::SuperChip => Chip8Mode::SUPER_CHIP,
        }
    }
}

/// CHIP-8 virtual machine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Filepath to Chip-8 ROM file that will be executed
    #[clap(index = 1)]
    rom: PathBuf,

    /// Filepath to font file
    #[clap(long)]
    font: Option<PathBuf>,

    /// Background Color as HEX 0xAABBFF [default: 0x000000]
    #[clap(long)]
    background: Option<Chip8Color>,

    /// Foreground Color as HEX 0xAABBFF [default: 0xFFFFFF]
    #[clap(long)]
    foreground: Option<Chip8Color>,

    /// Display scaling factor
    #[clap(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=100))]
    scale: u32,

    /// Instructions per second
    #[clap(short, long, default_value_t = 700, value_parser = clap::value_parser!(u32).range(1..=1_000_000))]
    ips: u32,

    /// PRNG seed
    #[clap(long)]
    seed: Option<u64>,

    /// Interpreter quirks to emulate
    #[clap(short, long, value_enum, default_value_t = Mode::Standard)]
    mode: Mode,

    /// Trace every executed instruction
    #[clap(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.debug { "chip_8_vm=trace,info" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut builder = Chip8Builder::new().with_mode(args.mode.into());

    let rom_data = std::fs::read(&args.rom)
        .map_err(|err| format!("failed to read ROM file {}: {}", args.rom.display(), err))?;
    builder = builder.with_rom(rom_data);

    if let Some(font) = &args.font {
        let font_data = std::fs::read(font)
            .map_err(|err| format!("failed to read font file {}: {}", font.display(), err))?;
        builder = builder.with_font(font_data);
    }

    if let Some(foreground) = args.foreground {
        builder = builder.with_foreground(foreground);
    }

    let background = args.background.unwrap_or(chip_8_vm::DEFAULT_BACKGROUND_COLOR);
    builder = builder.with_background(background);

    if let Some(seed) = args.seed {
        builder = builder.with_rng_seed(seed);
    }

    let mut chip = builder.build()?;
    info!("Loaded {} ({:?} mode)", args.rom.display(), args.mode);

    let sdl_context = sdl2::init()?;
    let video_subsystem = sdl_context.video()?;

    let window = video_subsystem
        .window(
            WINDOW_TITLE,
            SCREEN_WIDTH as u32 * args.scale,
            SCREEN_HEIGHT as u32 * args.scale,
        )
        .position_centered()
        .build()?;

    let mut canvas = window.into_canvas().build()?;

    canvas.set_draw_color(Color::RGB(background.r, background.g, background.b));
    canvas.clear();
    canvas.present();

    let texture_creator = canvas.texture_creator();
    let mut texture = texture_creator.create_texture_streaming(
        PixelFormatEnum::RGBX8888,
        SCREEN_WIDTH as u32,
        SCREEN_HEIGHT as u32,
    )?;

    let mut event_pump = sdl_context.event_pump()?;

    let mut keys = [false; KEY_COUNT];
    let mut sounding = false;

    let delta_update = Duration::new(0, 1_000_000_000u32 / args.ips);
    let mut next_update = Instant::now();
    let mut next_tick = next_update + TIMER_PERIOD;

    'running: loop {
        // Wait until next update
        let now = Instant::now();
        if let Some(delay) = next_update.checked_duration_since(now) {
            ::std::thread::sleep(delay);
        }
        next_update += delta_update;

        // Step the timers once for every 60 Hz period that has elapsed
        let now = Instant::now();
        while now >= next_tick {
            chip.tick_timers();
            next_tick += TIMER_PERIOD;
        }

        // Process events
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    if let Some(hex) = keymap(key) {
                        keys[hex] = true;
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(hex) = keymap(key) {
                        keys[hex] = false;
                    }
                }
                _ => {}
            }
        }

        // Execute one CHIP-8 instruction against a fresh keypad snapshot
        chip.set_keys(keys);
        chip.cycle();

        // Show the tone in the title bar while the sound timer runs
        if chip.is_sound_active() != sounding {
            sounding = chip.is_sound_active();
            let title = if sounding {
                format!("{} ♪", WINDOW_TITLE)
            } else {
                WINDOW_TITLE.to_string()
            };
            canvas.window_mut().set_title(&title)?;
        }

        // If display buffer was changed then draw changes on canvas
        if let Some(display) = chip.take_frame() {
            // Copy CHIP-8 display buffer into GPU texture
            texture.update(None, display.buffer(), SCREEN_WIDTH * 4)?;

            // Copy texture to Canvas
            canvas.copy(&texture, None, None)?;

            // present canvas on screen
            canvas.present();
        }
    }

    Ok(())
}
