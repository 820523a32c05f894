//! mobi-meta - Show MOBI ebook metadata and extract covers

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bstr::ByteSlice;
use clap::Parser;
use serde::Serialize;

use mobi_meta::mobi::{Compression, Encoding, detect_image_type, extension_for};
use mobi_meta::{ExthType, Metadata};

#[derive(Parser)]
#[command(name = "mobi-meta")]
#[command(version, about = "Show MOBI ebook metadata", long_about = None)]
#[command(after_help = "EXAMPLES:
    mobi-meta book.mobi                   Show title and EXTH metadata
    mobi-meta book.mobi --json            Same, as JSON
    mobi-meta book.mobi --cover out.jpg   Save the cover image
    mobi-meta book.mobi --exth 113        Print one raw EXTH record")]
struct Cli {
    /// Input file (MOBI, AZW)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Print metadata as JSON
    #[arg(long)]
    json: bool,

    /// Print the payload of one EXTH record type
    #[arg(long, value_name = "TYPE")]
    exth: Option<u32>,

    /// Save the cover image to PATH
    #[arg(long, value_name = "PATH")]
    cover: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct Info {
    title: String,
    database_name: String,
    record_count: u16,
    compression: String,
    encoding: String,
    mobi_type: u32,
    file_version: u32,
    first_image_index: u32,
    exth: Vec<ExthField>,
    cover: Option<CoverInfo>,
}

#[derive(Serialize)]
struct ExthField {
    code: u32,
    name: &'static str,
    value: String,
}

#[derive(Serialize)]
struct CoverInfo {
    offset: u64,
    length: u64,
    media_type: Option<&'static str>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> mobi_meta::Result<()> {
    let meta = Metadata::open(&cli.input)?;

    if let Some(code) = cli.exth {
        match meta.exth_lookup(code) {
            Some(payload) => println!("{}", payload.to_str_lossy()),
            None if !cli.quiet => eprintln!("No EXTH record of type {code}"),
            None => {}
        }
    } else if cli.json {
        let info = collect_info(&meta)?;
        let json = serde_json::to_string_pretty(&info)
            .map_err(|e| mobi_meta::Error::Io(e.into()))?;
        println!("{json}");
    } else if cli.cover.is_none() {
        print_info(&collect_info(&meta)?, &cli.input);
    }

    if let Some(ref path) = cli.cover {
        match meta.extract_cover()? {
            Some(image) => {
                let path = cover_path(path, &image);
                std::fs::write(&path, &image)?;
                if !cli.quiet {
                    eprintln!("Saved cover to {}", path.display());
                }
            }
            None if !cli.quiet => eprintln!("No cover image in {}", cli.input.display()),
            None => {}
        }
    }

    Ok(())
}

fn collect_info(meta: &Metadata) -> mobi_meta::Result<Info> {
    let palm = meta.palm_doc_header();
    let mobi = meta.mobi_header();

    let exth = ExthType::ALL
        .into_iter()
        .filter_map(|ty| {
            meta.exth(ty).map(|payload| ExthField {
                code: ty.code(),
                name: ty.name(),
                value: display_payload(ty, payload),
            })
        })
        .collect();

    let cover = cover_info(meta);

    Ok(Info {
        title: meta.title_string()?,
        database_name: meta.database_name()?.to_str_lossy().into_owned(),
        record_count: meta.record_count()?,
        compression: match palm.compression {
            Compression::None => "none".to_string(),
            Compression::PalmDoc => "palmdoc".to_string(),
            Compression::Huffman => "huffcdic".to_string(),
            Compression::Unknown(n) => format!("unknown ({n})"),
        },
        encoding: match mobi.encoding {
            Encoding::Cp1252 => "cp1252".to_string(),
            Encoding::Utf8 => "utf-8".to_string(),
            Encoding::Unknown(n) => format!("unknown ({n})"),
        },
        mobi_type: mobi.mobi_type,
        file_version: mobi.file_version,
        first_image_index: mobi.first_image_index,
        exth,
        cover,
    })
}

/// Cover location and type; a cover that cannot be resolved is reported as
/// unavailable so the rest of the metadata still prints.
fn cover_info(meta: &Metadata) -> Option<CoverInfo> {
    let resolve = || -> mobi_meta::Result<Option<CoverInfo>> {
        let Some(range) = meta.cover_range()? else {
            return Ok(None);
        };
        let sniff_len = (range.end - range.start).min(4) as usize;
        let head = meta.data().read_at(range.start, sniff_len)?;
        Ok(Some(CoverInfo {
            offset: range.start,
            length: range.end - range.start,
            media_type: detect_image_type(&head),
        }))
    };

    resolve().unwrap_or_else(|e| {
        log::warn!("cover unavailable: {e}");
        None
    })
}

/// Image indices are binary; everything else is shown as text.
fn display_payload(ty: ExthType, payload: &[u8]) -> String {
    match (ty, payload) {
        (ExthType::CoverOffset | ExthType::ThumbOffset, [a, b, c, d]) => {
            u32::from_be_bytes([*a, *b, *c, *d]).to_string()
        }
        _ => payload.to_str_lossy().trim().to_string(),
    }
}

/// Adds an extension matching the image when `path` has none.
fn cover_path(path: &Path, image: &[u8]) -> PathBuf {
    match (path.extension(), detect_image_type(image)) {
        (None, Some(media_type)) => path.with_extension(extension_for(media_type)),
        _ => path.to_path_buf(),
    }
}

fn print_info(info: &Info, path: &Path) {
    println!("File: {}", path.display());
    println!("Title: {}", info.title);
    println!("Database: {}", info.database_name);
    println!("Records: {}", info.record_count);
    println!("Compression: {}", info.compression);
    println!("Encoding: {}", info.encoding);
    for field in &info.exth {
        let value = &field.value;
        if value.len() > 200 {
            let cut = (0..=200).rev().find(|&i| value.is_char_boundary(i)).unwrap_or(0);
            println!("{}: {}...", field.name, &value[..cut]);
        } else {
            println!("{}: {value}", field.name);
        }
    }
    match &info.cover {
        Some(cover) => println!(
            "Cover: {} bytes at {} ({})",
            cover.length,
            cover.offset,
            cover.media_type.unwrap_or("unknown type")
        ),
        None => println!("Cover: none"),
    }
}
