//! visionwire-inspect: decode one encoded message and summarize it

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use visionwire::datatype::ADatatype;
use visionwire::{
    CameraControl, Config, ImageManipConfig, ImgFrame, NNData, RawMessage, SoftwareConverter,
    SystemInformation,
};

#[derive(Parser, Debug)]
#[command(name = "visionwire-inspect", version, about = "Decode an encoded message and print a summary")]
struct Args {
    /// Encoded message file
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Export an ImgFrame as PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Debug logging, overrides RUST_LOG
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).wrap_err("Failed to load configuration")?;
    let filter = if args.verbose {
        EnvFilter::new("visionwire=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    debug!("Configuration: {:?}", config);
    config.install();

    let bytes = std::fs::read(&args.input)
        .wrap_err_with(|| format!("Failed to read {}", args.input.display()))?;
    let msg = RawMessage::decode(&bytes)
        .wrap_err_with(|| format!("Failed to decode {}", args.input.display()))?;

    let base = msg.buffer();
    info!(
        "{}: {} bytes, payload {} bytes, seq {}, ts {:.6}s",
        msg.kind(),
        bytes.len(),
        base.data.len(),
        base.sequence_num,
        base.ts.as_secs_f64()
    );

    match msg {
        RawMessage::ImgFrame(raw) => {
            let frame = ImgFrame::from(raw);
            summarize_frame(&frame);
            if let Some(path) = &args.png {
                write_png(&frame, path)?;
                info!("Wrote {}", path.display());
            }
            return Ok(());
        }
        RawMessage::NNData(raw) => summarize_nn_data(&NNData::from(raw)),
        RawMessage::CameraControl(raw) => {
            let ctrl = CameraControl::from(raw);
            info!("capture_still: {}", ctrl.get_capture_still());
        }
        RawMessage::SystemInformation(raw) => summarize_system(&SystemInformation::from(raw)),
        RawMessage::ImageManipConfig(raw) => summarize_manip(&ImageManipConfig::from(raw)),
        RawMessage::Buffer(_) => {}
    }

    if args.png.is_some() {
        warn!("--png only applies to ImgFrame messages");
    }
    Ok(())
}

fn summarize_frame(frame: &ImgFrame) {
    let specs = frame.get_specs();
    info!(
        "{:?} {}x{} stride {}, category {}, instance {}",
        specs.format,
        specs.width,
        specs.height,
        specs.stride,
        frame.get_category(),
        frame.get_instance_num()
    );
    match frame.frame_shape() {
        Some(shape) => info!("Frame shape {:?}", shape),
        None => info!("Flat payload of {} bytes", frame.get_data().len()),
    }
}

fn summarize_nn_data(nn: &NNData) {
    info!(
        "{} layers, batch size {}",
        nn.get_all_layers().len(),
        nn.get_batch_size()
    );
    for layer in nn.get_all_layers() {
        info!(
            "  {}: {:?} {:?} dims {:?}, {} elements at offset {}",
            layer.name,
            layer.data_type,
            layer.order,
            layer.dims,
            layer.num_elements(),
            layer.offset
        );
        if let Some(rank) = layer.order.rank() {
            if rank != layer.dims.len() {
                warn!(
                    "  {}: {:?} names {} axes but {} dims are set",
                    layer.name,
                    layer.order,
                    rank,
                    layer.dims.len()
                );
            }
        }
    }
}

fn summarize_system(info: &SystemInformation) {
    let ddr = info.get_ddr_memory_usage();
    info!("DDR: {} of {} bytes used", ddr.used, ddr.total);
    for (name, cpu) in [
        ("LeonCSS", info.get_leon_css_cpu_usage()),
        ("LeonMSS", info.get_leon_mss_cpu_usage()),
    ] {
        info!("{} CPU: {:.1}%", name, cpu.average * 100.0);
    }
    info!(
        "Chip temperature: {:.1}C average",
        info.get_chip_temperature().average
    );
}

fn summarize_manip(cfg: &ImageManipConfig) {
    let raw = cfg.get_raw();
    if raw.enable_crop {
        info!(
            "Crop ({:.3}, {:.3})..({:.3}, {:.3}), center crop {}",
            cfg.get_crop_x_min(),
            cfg.get_crop_y_min(),
            cfg.get_crop_x_max(),
            cfg.get_crop_y_max(),
            cfg.is_center_crop()
        );
    }
    if raw.enable_resize {
        info!(
            "Resize {}x{}, thumbnail {}",
            cfg.get_resize_width(),
            cfg.get_resize_height(),
            cfg.is_resize_thumbnail()
        );
    }
    if raw.enable_format {
        info!(
            "Format {:?}, horizontal flip {}",
            cfg.get_frame_type(),
            cfg.is_horizontal_flip()
        );
    }
}

fn write_png(frame: &ImgFrame, path: &Path) -> Result<()> {
    let bgr = frame.get_bgr_frame(Some(&SoftwareConverter))?;
    let pixels = bgr
        .as_u8()
        .ok_or_else(|| eyre!("{:?} frames cannot be exported", frame.get_type()))?;
    let mut data: Vec<u8> = pixels.iter().copied().collect();

    match *pixels.shape() {
        [height, width, 3] => {
            for px in data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            image::RgbImage::from_raw(u32::try_from(width)?, u32::try_from(height)?, data)
                .ok_or_else(|| eyre!("Pixel buffer does not match {}x{}", width, height))?
                .save(path)?;
        }
        [height, width] => {
            image::GrayImage::from_raw(u32::try_from(width)?, u32::try_from(height)?, data)
                .ok_or_else(|| eyre!("Pixel buffer does not match {}x{}", width, height))?
                .save(path)?;
        }
        ref shape => return Err(eyre!("Frame shape {:?} has no image form", shape)),
    }
    Ok(())
}
