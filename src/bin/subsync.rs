use clap::{CommandFactory, Parser};
use serde_json::json;
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    process,
};
use subsync::codepage::CodepageTable;
use subsync::timestamp::{parse_offset, parse_scale};
use subsync::{retime, ChopRange, Error, RetimeOptions, TimeRange, Transform};
use tracing_subscriber::EnvFilter;

/// Defines the command line arguments accepted by the program.
#[derive(Parser, Debug)]
#[command(
    name = "subsync",
    about = "Resync the time stamps of SRT and SSA/ASS subtitle files.",
    after_help = "Offsets are a signed time stamp (-0:0:10,199), a difference of two time \
        stamps, expected minus actual (+01:44:31,660-01:44:36,290), or signed milliseconds \
        (+19700). Scales are a frame rate id (N-P, P-N, N-C, C-N, P-C, C-P), a ratio of two \
        time stamps, expected over actual (01:44:30,290/01:44:31,660), or a real number \
        (1.000955).",
    version
)]
struct Args {
    /// Input subtitle file. Reads stdin if not provided.
    #[arg()]
    input_file: Option<String>,

    /// Shift every time stamp by this offset.
    #[arg(long, allow_hyphen_values = true, value_name = "EXPR")]
    offset: Option<String>,

    /// Scale every time stamp by this ratio, after the offset.
    #[arg(long, allow_hyphen_values = true, value_name = "EXPR")]
    scale: Option<String>,

    /// Only retime time stamps between START and END, both inclusive. END
    /// is only taken when it is a time offset; anything else is the input.
    #[arg(short, long, num_args = 1..=2, allow_hyphen_values = true, value_names = ["START", "END"])]
    span: Vec<String>,

    /// Remove subtitles N to M, counted from 1.
    #[arg(short, long, value_name = "N:M")]
    chop: Option<ChopRange>,

    /// Encoding of the input when it has no byte order mark.
    #[arg(short, long, value_name = "NAME")]
    encoding: Option<String>,

    /// Encoding of the output.
    #[arg(long, value_name = "NAME", default_value = "UTF-8")]
    output_encoding: String,

    /// Renumber SRT subtitles, starting from NUM (default 1). NUM is only
    /// taken when it is a number; anything else is the input.
    #[arg(short, long, num_args = 0..=1, default_missing_value = "1", value_name = "NUM")]
    reorder: Option<String>,

    /// Output file to write to. Writes stdout if not provided.
    #[arg(short, long, value_name = "FILE")]
    write: Option<String>,

    /// Log what is being done to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Print the resolved configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

fn is_number(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// `--span` and `--reorder` have optional trailing values that clap hands
/// out greedily. A value that does not fit its option is moved back to the
/// input file when none was given.
fn claim_input(args: &mut Args) {
    if args.input_file.is_none() && args.span.len() == 2 && parse_offset(&args.span[1]).is_none() {
        args.input_file = args.span.pop();
    }

    let stray = args.reorder.as_deref().is_some_and(|value| !is_number(value));
    if args.input_file.is_none() && stray {
        args.input_file = args.reorder.replace("1".to_owned());
    }
}

fn offset_arg(text: &str) -> Result<i64, Error> {
    parse_offset(text).ok_or_else(|| Error::InvalidOffset(text.to_owned()))
}

fn build_transform(args: &Args) -> Result<Transform, Error> {
    let mut transform = Transform::new();
    if let Some(text) = &args.offset {
        transform = transform.with_offset(offset_arg(text)?);
    }
    if let Some(text) = &args.scale {
        let scale = parse_scale(text).ok_or_else(|| Error::InvalidScale(text.to_owned()))?;
        transform = transform.with_scale(scale);
    }

    let start = args.span.first().map(|s| offset_arg(s)).transpose()?;
    let end = args.span.get(1).map(|s| offset_arg(s)).transpose()?;
    Ok(transform.with_range(TimeRange::new(start, end)))
}

fn build_options(args: &Args, codepages: &mut CodepageTable) -> Result<RetimeOptions, Error> {
    let mut options = RetimeOptions::new()
        .with_transform(build_transform(args)?)
        .with_chop(args.chop.unwrap_or_default())
        .with_output(codepages.register(&args.output_encoding)?);
    if let Some(name) = &args.encoding {
        options = options.with_source(codepages.register(name)?);
    }
    if let Some(text) = &args.reorder {
        let start = text
            .parse::<u32>()
            .map_err(|_| Error::InvalidRenumber(text.to_owned()))?;
        options = options.with_renumber(start);
    }
    Ok(options)
}

fn dump_config(options: &RetimeOptions, codepages: &CodepageTable) -> serde_json::Value {
    let name = |index: usize| codepages.get(index).map(|cp| cp.name.to_string());
    let transform = &options.transform;
    json!({
        "offset": transform.offset,
        "scale": transform.scale,
        "span": [transform.range.start, transform.range.end],
        "chop": [options.chop.start, options.chop.end],
        "renumber": options.renumber,
        "source": options.source.and_then(name),
        "output": name(options.output),
    })
}

fn run(mut args: Args) -> Result<(), Error> {
    claim_input(&mut args);

    let mut codepages = CodepageTable::new();
    let options = build_options(&args, &mut codepages)?;

    if args.dump_config {
        println!("{}", dump_config(&options, &codepages));
        return Ok(());
    }

    if !options.has_work() {
        Args::command().print_help()?;
        return Ok(());
    }

    let reader: Box<dyn BufRead> = match &args.input_file {
        Some(name) => Box::new(BufReader::new(File::open(name)?)),
        None => Box::new(io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match &args.write {
        Some(name) => Box::new(BufWriter::new(File::create(name)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let report = retime(reader, writer, &options, &codepages)?;
    if report.degraded {
        eprintln!("Warning: could not transcode, the output holds the input bytes unchanged");
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
