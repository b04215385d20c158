use liquid_gauge::{wave_vector, Color, FrameSurface, Gauge, GaugeOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build a gauge configuration with the bon-generated builder. Anything
    // left unset falls back to the documented defaults.
    let options = GaugeOptions::builder()
        .level(82.0)
        .phase(0.0)
        .time_shift(0.0)
        .frequency(0.25)
        .amplitude(9.0)
        .fill_color(|level| {
            if level < 50.0 {
                Color::new(0x20, 0x60, 0xc0)
            } else {
                Color::new(0xc0, 0x40, 0x20)
            }
        })
        .build();

    // Attach to an in-memory framebuffer; dimensions resolve from its bounds.
    let mut gauge = Gauge::attach(FrameSurface::new(400, 300), options)?;

    println!("Attached gauge:");
    println!("- dimensions: {}x{}", gauge.config().width, gauge.config().height);
    println!("- level: {}", gauge.config().level);
    println!(
        "- fill color at this level: {:?}",
        (gauge.config().fill_color)(gauge.config().level)
    );

    // One still frame, then a few manually driven animation ticks. Any
    // scheduler can drive the clock; here it is just a loop.
    gauge.render(false);
    let handle = gauge.render(true).expect("animated render returns a handle");
    for _ in 0..5 {
        gauge.tick(&handle);
    }
    println!("- elapsed ticks: {}", gauge.elapsed_ticks());

    let polygon = wave_vector(gauge.config(), 500.0);
    println!("- fill polygon points: {}", polygon.len());
    println!(
        "- surface crest near mid-container: {:.2}",
        polygon
            .iter()
            .skip(2)
            .take(100)
            .map(|p| p.y)
            .fold(f64::NEG_INFINITY, f64::max)
    );

    Ok(())
}
