use subsync::codepage::{CodepageTable, KNOWN, UTF_8};
use subsync::retime::chop::Format;
use subsync::timestamp::{self, Style};
use subsync::{retime, ChopRange, RetimeOptions, Transform};

use lipsum::lipsum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Gamma};

struct Cue {
    start: i64,
    end: i64,
    text: String,
}

fn generate_cues(rng: &mut ChaCha8Rng, n_cues: usize) -> Vec<Cue> {
    // gaps and durations in milliseconds
    let gap = Gamma::new(2.0, 1500.0).unwrap();
    let duration = Gamma::new(4.0, 600.0).unwrap();

    let mut clock = 0i64;
    let mut cues = Vec::with_capacity(n_cues);
    for _ in 0..n_cues {
        let start = clock + gap.sample(rng) as i64;
        let end = start + duration.sample(rng) as i64 + 1;
        clock = end;

        let words = rng.gen_range(2..12);
        cues.push(Cue {
            start,
            end,
            text: lipsum(words),
        });
    }
    cues
}

fn srt_document(cues: &[Cue]) -> String {
    let mut doc = String::new();
    for (i, cue) in cues.iter().enumerate() {
        doc.push_str(&format!(
            "{}\r\n{} --> {}\r\n{}\r\n\r\n",
            i + 1,
            timestamp::format(cue.start, Style::Srt),
            timestamp::format(cue.end, Style::Srt),
            cue.text
        ));
    }
    doc
}

fn ass_document(cues: &[Cue]) -> String {
    let mut doc = String::from(
        "[Script Info]\nScriptType: v4.00+\n\n[Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
    );
    for cue in cues {
        doc.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0000,0000,0000,,{}\n",
            timestamp::format(cue.start, Style::Ass),
            timestamp::format(cue.end, Style::Ass),
            cue.text
        ));
    }
    doc
}

fn run(input: &[u8], options: &RetimeOptions) -> Vec<u8> {
    let mut output = Vec::new();
    retime(input, &mut output, options, &CodepageTable::new()).unwrap();
    output
}

fn shift(offset: i64) -> RetimeOptions {
    RetimeOptions::new().with_transform(Transform::new().with_offset(offset))
}

#[test]
fn test_srt_shift_there_and_back() {
    let seed = 129530786u64;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let cues = generate_cues(&mut rng, 200);
    let original = srt_document(&cues);

    for _ in 0..10 {
        let offset = rng.gen_range(1..3_600_000);
        let forward = run(original.as_bytes(), &shift(offset));
        assert_ne!(forward, original.as_bytes());

        let back = run(&forward, &shift(-offset));
        assert_eq!(String::from_utf8(back).unwrap(), original);
    }
}

#[test]
fn test_srt_shift_moves_every_cue() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let cues = generate_cues(&mut rng, 100);
    let offset = 12_345;

    let output = run(srt_document(&cues).as_bytes(), &shift(offset));
    let moved: Vec<Cue> = cues
        .iter()
        .map(|cue| Cue {
            start: cue.start + offset,
            end: cue.end + offset,
            text: cue.text.clone(),
        })
        .collect();

    assert_eq!(String::from_utf8(output).unwrap(), srt_document(&moved));
}

#[test]
fn test_utf16le_input_matches_utf8_input() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let cues = generate_cues(&mut rng, 50);
    let doc = srt_document(&cues) + "Ça va très bien\r\n";

    let mut utf16 = b"\xFF\xFE".to_vec();
    for unit in doc.encode_utf16() {
        utf16.extend(unit.to_le_bytes());
    }

    let options = shift(-250);
    assert_eq!(run(&utf16, &options), run(doc.as_bytes(), &options));
}

#[test]
fn test_utf16le_round_trip() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let cues = generate_cues(&mut rng, 50);
    let doc = srt_document(&cues);

    let utf16le = KNOWN.iter().position(|cp| cp.name == "UTF-16LE").unwrap();
    let mut codepages = CodepageTable::new();
    let forward_options = shift(5_000).with_source(UTF_8).with_output(utf16le);

    let mut forward = Vec::new();
    let report = retime(doc.as_bytes(), &mut forward, &forward_options, &codepages).unwrap();
    assert!(forward.starts_with(b"\xFF\xFE"));
    assert_eq!(report.lines_written, cues.len() * 4);

    let back_options = shift(-5_000).with_output(codepages.register("utf-8").unwrap());
    let mut back = Vec::new();
    let report = retime(&forward[..], &mut back, &back_options, &codepages).unwrap();
    assert_eq!(report.source.as_deref(), Some("UTF-16LE"));
    assert_eq!(String::from_utf8(back).unwrap(), doc);
}

#[test]
fn test_ass_shift_keeps_centiseconds() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let cues = generate_cues(&mut rng, 100);
    let offset = rng.gen_range(1..100_000) * 10;

    let output = run(ass_document(&cues).as_bytes(), &shift(offset));
    let output = String::from_utf8(output).unwrap();

    let dialogue: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with("Dialogue:"))
        .collect();
    assert_eq!(dialogue.len(), cues.len());

    for (line, cue) in dialogue.iter().zip(&cues) {
        let fields: Vec<&str> = line.splitn(4, ',').collect();
        let (start, _) = timestamp::parse(fields[1].as_bytes()).unwrap();
        let (end, _) = timestamp::parse(fields[2].as_bytes()).unwrap();

        assert_eq!(start.millis, cue.start / 10 * 10 + offset);
        assert_eq!(end.millis, cue.end / 10 * 10 + offset);
        assert!(line.ends_with(&cue.text));
    }
}

#[test]
fn test_chop_and_renumber_end_to_end() {
    let mut rng = ChaCha8Rng::seed_from_u64(31337);
    let n_cues = 60;
    let cues = generate_cues(&mut rng, n_cues);

    for _ in 0..5 {
        let start = rng.gen_range(1..=n_cues);
        let end = rng.gen_range(start..=n_cues);
        let options = RetimeOptions::new()
            .with_chop(ChopRange::new(start as i64, end as i64))
            .with_renumber(1);

        let mut output = Vec::new();
        let report = retime(srt_document(&cues).as_bytes(), &mut output, &options, &CodepageTable::new()).unwrap();
        assert_eq!(report.format, Format::Srt);

        let kept: Vec<Cue> = cues
            .iter()
            .enumerate()
            .filter(|(i, _)| i + 1 < start || i + 1 > end)
            .map(|(_, cue)| Cue {
                start: cue.start,
                end: cue.end,
                text: cue.text.clone(),
            })
            .collect();
        assert_eq!(report.lines_chopped, (end - start + 1) * 4);
        assert_eq!(String::from_utf8(output).unwrap(), srt_document(&kept));
    }
}
