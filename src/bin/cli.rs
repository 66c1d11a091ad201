use anyhow::{anyhow, bail, Context};
use idcapture::camera::StillImageSource;
use idcapture::controller::Snapshot;
use idcapture::{
    CameraSource, CaptureController, HttpSubmitter, QualityEvaluator, SessionState,
    VerifierConfig, VisionEngine,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

const USAGE: &str = "Usage: idcapture-cli <check|verify|init-config> [args]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    idcapture::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    let command = &args[1];
    let code = match command.as_str() {
        "check" => cmd_check(&args).await?,
        "verify" => cmd_verify(&args).await?,
        "init-config" => cmd_init_config(&args)?,
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("{}", USAGE);
            1
        }
    };

    // Every session is dropped by now, so no device is left open.
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Exit code for the state a `verify` run stopped in.
fn exit_code(state: SessionState) -> i32 {
    match state {
        SessionState::Pass => 0,
        SessionState::Idle => 1,
        SessionState::Capturing | SessionState::PreviewBlurry => 2,
        _ => 3,
    }
}

struct Options {
    image: Option<PathBuf>,
    config_path: Option<PathBuf>,
    endpoint: Option<String>,
    use_camera: bool,
    json: bool,
}

fn parse_options(args: &[String]) -> anyhow::Result<Options> {
    let mut options = Options {
        image: None,
        config_path: None,
        endpoint: None,
        use_camera: false,
        json: false,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                options.config_path = Some(args.get(i).context("--config needs a path")?.into());
            }
            "--endpoint" => {
                i += 1;
                options.endpoint = Some(args.get(i).context("--endpoint needs a URL")?.clone());
            }
            "--camera" => options.use_camera = true,
            "--json" => options.json = true,
            other if other.starts_with("--") => bail!("Unknown option: {}", other),
            other => {
                if options.image.is_some() {
                    bail!("Only one image may be given");
                }
                options.image = Some(other.into());
            }
        }
        i += 1;
    }

    Ok(options)
}

fn load_config(options: &Options) -> anyhow::Result<VerifierConfig> {
    let mut config = match &options.config_path {
        Some(path) => VerifierConfig::load_from_file(path)?,
        None => VerifierConfig::load_or_default(),
    };
    if let Some(endpoint) = &options.endpoint {
        config.submission.endpoint = endpoint.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn cmd_check(args: &[String]) -> anyhow::Result<i32> {
    let options = parse_options(args)?;
    let path = options
        .image
        .as_ref()
        .ok_or_else(|| anyhow!("Usage: idcapture-cli check <image> [--config FILE] [--json]"))?;
    let config = load_config(&options)?;

    let engine = Arc::new(VisionEngine::new());
    engine.load().await;
    let evaluator = QualityEvaluator::new(engine, &config.quality);

    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mime_type = image::guess_format(&data)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream");
    let score = evaluator.evaluate(&idcapture::Frame::new(data, mime_type)).await?;

    if options.json {
        println!("{}", serde_json::to_string(&score)?);
    } else {
        println!(
            "{:?} variance {:.2} (threshold {:.2}): {}",
            score.algorithm,
            score.variance,
            score.threshold,
            if score.is_blurry { "BLURRY" } else { "sharp" }
        );
    }

    Ok(if score.is_blurry { 2 } else { 0 })
}

async fn cmd_verify(args: &[String]) -> anyhow::Result<i32> {
    let options = parse_options(args)?;
    let config = load_config(&options)?;

    if options.use_camera {
        #[cfg(feature = "native")]
        {
            return verify_with(idcapture::camera::NativeCamera::new(), &config, options.json).await;
        }
        #[cfg(not(feature = "native"))]
        {
            bail!("--camera requires idcapture built with the `native` feature");
        }
    }

    let image = options.image.as_ref().ok_or_else(|| {
        anyhow!("Usage: idcapture-cli verify <image>|--camera [--endpoint URL] [--config FILE] [--json]")
    })?;
    let camera = StillImageSource::from_file(image)?;
    verify_with(camera, &config, options.json).await
}

async fn verify_with<C: CameraSource>(
    camera: C,
    config: &VerifierConfig,
    json: bool,
) -> anyhow::Result<i32> {
    let engine = Arc::new(VisionEngine::new());
    engine.load().await;
    let submitter = Arc::new(HttpSubmitter::new(&config.submission)?);
    let mut session = CaptureController::from_config(camera, engine, submitter, config);

    let snapshot = session.run_once().await;
    drop(session);

    report(&snapshot, json)?;
    Ok(exit_code(snapshot.state))
}

fn report(snapshot: &Snapshot, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }

    println!("Status: {}", snapshot.state);
    if let Some(error) = &snapshot.error {
        println!("Reason: {}", error);
    }
    if let Some(result) = &snapshot.result {
        for (label, value) in result.fields.display_rows() {
            println!("{:>4}: {}", label, value);
        }
    }
    Ok(())
}

fn cmd_init_config(args: &[String]) -> anyhow::Result<i32> {
    let path = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(VerifierConfig::default_path);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    VerifierConfig::default().save_to_file(&path)?;
    println!("Wrote {}", path.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(SessionState::Pass), 0);
        assert_eq!(exit_code(SessionState::Idle), 1);
        assert_eq!(exit_code(SessionState::Capturing), 2);
        assert_eq!(exit_code(SessionState::PreviewBlurry), 2);
        assert_eq!(exit_code(SessionState::Fail), 3);
    }
}
