use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use imghide::{decode, encode, hash_password, write_output, EncodingLevel, Image};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!("imghide {} - LSB image steganography with AES-256-CBC encryption", VERSION);
    println!();
    println!("USAGE:");
    println!("    imghide encode --image <in.png> --payload <file> --password <pw> [--level low|medium|high] --output <out.png>");
    println!("    imghide decode --image <in.png> --password <pw> [--output <path>]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

fn print_version() {
    println!("imghide {}", VERSION);
}

struct EncodeArgs {
    image: PathBuf,
    payload: PathBuf,
    password: String,
    level: EncodingLevel,
    output: PathBuf,
}

struct DecodeArgs {
    image: PathBuf,
    password: String,
    output: Option<PathBuf>,
}

fn parse_flag_value(args: &[String], idx: &mut usize, flag: &str) -> Result<String, String> {
    *idx += 1;
    args.get(*idx).cloned().ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_level(value: &str) -> Result<EncodingLevel, String> {
    match value.to_lowercase().as_str() {
        "low" => Ok(EncodingLevel::Low),
        "medium" => Ok(EncodingLevel::Medium),
        "high" => Ok(EncodingLevel::High),
        _ => Err(format!("unrecognized --level value '{value}' (expected low|medium|high)")),
    }
}

fn parse_encode_args(args: &[String]) -> Result<EncodeArgs, String> {
    let settings = imghide::config::Settings::load();
    let mut image = None;
    let mut payload = None;
    let mut password = None;
    let mut level = settings.default_encoding_level();
    let mut output = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--image" => image = Some(PathBuf::from(parse_flag_value(args, &mut i, "--image")?)),
            "--payload" => payload = Some(PathBuf::from(parse_flag_value(args, &mut i, "--payload")?)),
            "--password" => password = Some(parse_flag_value(args, &mut i, "--password")?),
            "--level" => level = parse_level(&parse_flag_value(args, &mut i, "--level")?)?,
            "--output" => output = Some(PathBuf::from(parse_flag_value(args, &mut i, "--output")?)),
            other => return Err(format!("unknown option: {other}")),
        }
        i += 1;
    }

    Ok(EncodeArgs {
        image: image.ok_or("--image is required")?,
        payload: payload.ok_or("--payload is required")?,
        password: password.ok_or("--password is required")?,
        level,
        output: output.ok_or("--output is required")?,
    })
}

fn parse_decode_args(args: &[String]) -> Result<DecodeArgs, String> {
    let mut image = None;
    let mut password = None;
    let mut output = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--image" => image = Some(PathBuf::from(parse_flag_value(args, &mut i, "--image")?)),
            "--password" => password = Some(parse_flag_value(args, &mut i, "--password")?),
            "--output" => output = Some(PathBuf::from(parse_flag_value(args, &mut i, "--output")?)),
            other => return Err(format!("unknown option: {other}")),
        }
        i += 1;
    }

    Ok(DecodeArgs {
        image: image.ok_or("--image is required")?,
        password: password.ok_or("--password is required")?,
        output,
    })
}

fn run_encode(args: EncodeArgs) -> Result<(), String> {
    let mut image = Image::load(&args.image).map_err(|e| e.to_string())?;
    let payload = std::fs::read(&args.payload)
        .map_err(|e| format!("cannot read payload '{}': {e}", args.payload.display()))?;
    let payload_name = payload_basename(&args.payload)?;
    let password_hash = hash_password(args.password.as_bytes());

    encode(&mut image, &password_hash, &payload, &payload_name, args.level, &args.output, None)
        .map_err(|e| e.to_string())?;

    println!("embedded {} bytes into {}", payload.len(), args.output.display());
    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<(), String> {
    let image = Image::load(&args.image).map_err(|e| e.to_string())?;
    let password_hash = hash_password(args.password.as_bytes());

    let decoded = decode(&image, &password_hash, None).map_err(|e| e.to_string())?;
    let output_path = args.output.unwrap_or_else(|| PathBuf::from(&decoded.name));

    write_output(&decoded, &output_path).map_err(|e| e.to_string())?;
    println!("recovered {} bytes as {}", decoded.data.len(), output_path.display());
    Ok(())
}

fn payload_basename(path: &Path) -> Result<String, String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or_else(|| format!("payload path '{}' has no valid file name", path.display()))
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("no subcommand given, use --help for usage information");
        return ExitCode::FAILURE;
    }

    let result = match args[1].as_str() {
        "-h" | "--help" => {
            print_help();
            Ok(())
        }
        "-v" | "--version" => {
            print_version();
            Ok(())
        }
        "encode" => parse_encode_args(&args[2..]).and_then(run_encode),
        "decode" => parse_decode_args(&args[2..]).and_then(run_decode),
        other => Err(format!("unknown subcommand: {other}\nuse --help for usage information")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::FAILURE
        }
    }
}
