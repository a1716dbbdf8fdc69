mod cli;

use scraperkit::config::{self, Config};
use scraperkit_archive::{make_archive, Archive, BuildRequest};
use scraperkit_av::{
    check_tools as av_check_tools, get_tool_path, Config as EncodeConfig, Param, Prober,
    ReencodeOptions, Transcoder,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "scraperkit=trace,scraperkit_av=trace,scraperkit_archive=trace".to_string()
        } else {
            "scraperkit=info,scraperkit_av=info,scraperkit_archive=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Probe { file, json } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            probe_file(&file, json, &config)
        }
        Commands::Reencode {
            src,
            dest,
            preset,
            set,
            raw,
            delete_src,
            strict,
            dry_run,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;

            let mut encode = preset.map(|p| p.config()).unwrap_or_default();
            for (name, value) in &set {
                let param: Param = name.parse()?;
                let value = param
                    .parse_value(value)
                    .with_context(|| format!("Invalid value for {}", name))?;
                encode.set(param, value)?;
            }
            for (flag, value) in raw {
                encode.set_raw(flag, value);
            }

            let mut options = ReencodeOptions::from(&config.reencode);
            options.delete_src |= delete_src;
            if strict {
                options.failsafe = false;
            }

            reencode_file(&src, &dest, &encode, options, dry_run, &config)
        }
        Commands::MakeArchive {
            request,
            no_workaround,
        } => build_archive(&request, no_workaround),
        Commands::InspectArchive {
            file,
            entry,
            suggest,
        } => inspect_archive(&file, entry.as_deref(), suggest.as_deref()),
        Commands::CheckTools => check_tools(),
        Commands::Version => {
            println!("scraperkit {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn probe_file(file: &Path, json: bool, config: &Config) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let ffprobe = get_tool_path("ffprobe", config.tools.ffprobe_path.as_deref())?;
    let media_info = Prober::with_program(ffprobe)
        .probe(file)
        .with_context(|| format!("Failed to probe {:?}", file))?;

    if json {
        let json_str = serde_json::to_string_pretty(&media_info)?;
        println!("{}", json_str);
    } else {
        println!("File: {}", file.display());
        println!("Codecs: {}", media_info.codecs.join(", "));
        let secs = media_info.duration;
        println!(
            "Duration: {:02}:{:02}:{:02}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        );
        println!("Bitrate: {} b/s", media_info.bitrate);
    }

    Ok(())
}

fn reencode_file(
    src: &Path,
    dest: &Path,
    encode: &EncodeConfig,
    options: ReencodeOptions,
    dry_run: bool,
    config: &Config,
) -> Result<()> {
    let args = encode.to_args();

    if dry_run {
        println!("[DRY RUN] ffmpeg -y -i file:{} {} file:{}", src.display(), args.join(" "), dest.display());
        return Ok(());
    }

    if !src.exists() {
        anyhow::bail!("Source file does not exist: {:?}", src);
    }

    let ffmpeg = get_tool_path("ffmpeg", config.tools.ffmpeg_path.as_deref())?;
    tracing::info!("Re-encoding {:?} to {:?}", src, dest);

    let (ok, output) = Transcoder::with_program(ffmpeg)
        .reencode_with_output(src, dest, &args, &options)
        .with_context(|| format!("Failed to re-encode {:?}", src))?;

    if ok {
        println!("Re-encoded {} -> {}", src.display(), dest.display());
        Ok(())
    } else {
        tracing::debug!("ffmpeg output:\n{}", output.combined());
        anyhow::bail!("ffmpeg could not re-encode {:?}", src)
    }
}

fn build_archive(request_path: &Path, no_workaround: bool) -> Result<()> {
    let content = std::fs::read_to_string(request_path)
        .with_context(|| format!("Failed to read build request: {:?}", request_path))?;
    let mut request: BuildRequest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse build request: {:?}", request_path))?;
    if no_workaround {
        request.workaround_nocancel = false;
    }

    let fpath = make_archive(&request)
        .with_context(|| format!("Failed to build archive from {:?}", request.build_dir))?;

    let archive = Archive::open(&fpath)?;
    println!("Created {} ({} entries)", fpath.display(), archive.entry_count());
    Ok(())
}

fn inspect_archive(file: &Path, entry: Option<&str>, suggest: Option<&str>) -> Result<()> {
    let mut archive =
        Archive::open(file).with_context(|| format!("Failed to open archive: {:?}", file))?;

    if let Some(path) = entry {
        let item = archive.get_item(path)?;
        println!("Path: {}", item.path);
        println!("Title: {}", item.title);
        println!("Mimetype: {}", item.mimetype);
        println!("Size: {} bytes", item.content.len());
        if let Some(text) = item.text() {
            println!("\n{}", text);
        }
        return Ok(());
    }

    if let Some(query) = suggest {
        let suggestions = archive.get_suggestions(query);
        println!("Suggestions for {:?}: {}", query, suggestions.len());
        for path in suggestions {
            println!("  {}", path);
        }
        return Ok(());
    }

    println!("File: {}", file.display());
    println!("Entries: {}", archive.entry_count());
    if let Some(main) = archive.main_path() {
        println!("Main page: {}", main);
    }
    println!("\nMetadata:");
    for (name, value) in archive.metadata() {
        println!("  {}: {}", name, value);
    }
    println!("\nEntries:");
    for path in archive.paths() {
        let marker = if archive.is_redirect(path) { " (redirect)" } else { "" };
        println!("  {}{}", path, marker);
    }

    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = av_check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}
