use clap::Parser;

use region_mapper::color;
use region_mapper::compositor::RegionCompositor;
use region_mapper::region_image::{CHUNKS_PER_REGION, IMAGE_HEIGHT, IMAGE_WIDTH, PIXELS_PER_CHUNK};

#[derive(Parser, Debug)]
#[command(name = "region_mapper")]
#[command(about = "Render test-pattern region images and save them as BMP files")]
struct Args {
    /// Output file name prefix (may include a directory)
    #[arg(short, long, default_value = "map")]
    prefix: String,

    /// Region X coordinate to render
    #[arg(short = 'x', long, default_value = "0")]
    region_x: i32,

    /// Region Z coordinate to render
    #[arg(short = 'z', long, default_value = "0")]
    region_z: i32,

    /// Also render the regions within this distance on both axes
    #[arg(short, long, default_value = "0")]
    radius: i32,

    /// Test pattern: "gradient" or "chunks"
    #[arg(long, default_value = "gradient")]
    pattern: String,
}

/// Shade sweep across U crossed with a mix blend down V.
fn render_gradient(compositor: &mut RegionCompositor) {
    let mut row = [0i32; IMAGE_WIDTH];
    for v in 0..IMAGE_HEIGHT {
        let ratio = (v * 256 / (IMAGE_HEIGHT - 1)) as i32;
        for (u, pixel) in row.iter_mut().enumerate() {
            let shade = (u * 127 / (IMAGE_WIDTH - 1)) as i32;
            let shaded = color::shade_color(0xC06020, shade);
            *pixel = color::mix_color(shaded, 0x2040A0, ratio);
        }
        compositor.set_pixel_row(0, v, &row);
    }
}

/// Chunk checkerboard with darkened grid lines on each chunk's edges.
fn render_chunks(compositor: &mut RegionCompositor) {
    for chunk_z in 0..CHUNKS_PER_REGION as i32 {
        for chunk_x in 0..CHUNKS_PER_REGION as i32 {
            let base = if (chunk_x + chunk_z) % 2 == 0 {
                0x3A7D2C
            } else {
                0x6FAF5B
            };
            compositor.erase_chunk(base, chunk_x, chunk_z);

            let border = color::shade_color(base, 40);
            let u0 = chunk_x * PIXELS_PER_CHUNK as i32;
            let v0 = chunk_z * PIXELS_PER_CHUNK as i32;
            for i in 0..PIXELS_PER_CHUNK as i32 {
                compositor.set_pixel(u0 + i, v0, border);
                compositor.set_pixel(u0, v0 + i, border);
            }
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let render: fn(&mut RegionCompositor) = match args.pattern.as_str() {
        "gradient" => render_gradient,
        "chunks" => render_chunks,
        other => {
            eprintln!("Unknown pattern: {} (expected \"gradient\" or \"chunks\")", other);
            std::process::exit(2);
        }
    };

    let span = 2 * args.radius + 1;
    println!(
        "Rendering {} {} region(s) around ({}, {}) with prefix \"{}\"",
        span * span,
        args.pattern,
        args.region_x,
        args.region_z,
        args.prefix
    );

    let mut compositor = RegionCompositor::new(args.prefix.clone());
    let mut failures = 0;

    for region_z in args.region_z - args.radius..=args.region_z + args.radius {
        for region_x in args.region_x - args.radius..=args.region_x + args.radius {
            if !compositor.begin_region(region_x, region_z) {
                continue;
            }
            render(&mut compositor);
            match compositor.end_region(region_x, region_z) {
                Ok(path) => println!("Saved {}", path.display()),
                Err(e) => {
                    eprintln!("Failed to save region ({}, {}): {}", region_x, region_z, e);
                    failures += 1;
                }
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
