use crate::error::ValidationError;
use crate::job::*;

use color_eyre::eyre::{Report, Result};
use std::path::PathBuf;
use treesort_segment::Segment;

/// A minimal record that validates: inline data, local method, output path.
fn inline_record() -> JobRecord {
    JobRecord {
        input_source: Some("fasta_data".to_string()),
        input_fasta_data: Some(">seq1|HA|\nACGT\n".to_string()),
        method: Some("local".to_string()),
        output_path: Some("/out".to_string()),
        ..Default::default()
    }
}

#[test]
fn inline_example_defaults() -> Result<(), Report> {
    let record: JobRecord = serde_json::from_str(
        r#"{
            "input_source": "fasta_data",
            "input_fasta_data": ">seq1|HA|\nACGT\n>seq2|NA|\nTTGG\n",
            "method": "mincut",
            "ref_segment": "",
            "output_path": "/out",
            "unknown_field": [1, 2, 3]
        }"#,
    )?;
    let config = validate(&record)?;

    assert!(config.prepare_dataset());
    assert_eq!(
        config.input_source(),
        Some(&InputSource::InlineData(">seq1|HA|\nACGT\n>seq2|NA|\nTTGG\n".to_string()))
    );
    assert_eq!(config.method, Method::MinCut);
    assert_eq!(config.inference_type, InferenceType::IqTree);
    assert_eq!(config.reference_segment, Segment::HA);
    assert!(config.segments.is_empty());
    assert_eq!(config.match_mode, MatchMode::None);
    assert_eq!(config.output_path, PathBuf::from("/out"));
    assert_eq!(config.existing_dataset_directory(), None);
    Ok(())
}

#[test]
fn null_fields_are_absent() -> Result<(), Report> {
    let record: JobRecord = serde_json::from_str(
        r#"{"input_source": "fasta_data", "input_fasta_data": ">a\nA\n", "method": "local",
            "output_path": "/out", "segments": null, "clades_path": null, "match_on_regex": null}"#,
    )?;
    let config = validate(&record)?;
    assert!(config.segments.is_empty());
    assert_eq!(config.clades_path, None);
    Ok(())
}

#[test]
fn ref_tree_inference_alias() -> Result<(), Report> {
    let record: JobRecord = serde_json::from_str(r#"{"ref_tree_inference": "FastTree"}"#)?;
    assert_eq!(record.inference_type.as_deref(), Some("FastTree"));
    Ok(())
}

#[test]
fn missing_payload_for_each_source() {
    let cases = [
        ("fasta_data", "input_fasta_data"),
        ("fasta_file", "input_fasta_file"),
        ("fasta_file_id", "input_fasta_file_id"),
    ];
    for (source, field) in cases {
        let record = JobRecord {
            input_source: Some(source.to_string()),
            input_fasta_data: Some("   \n".to_string()),
            input_fasta_file: None,
            input_fasta_file_id: Some("ws:".to_string()),
            ..inline_record()
        };
        assert_eq!(validate(&record), Err(ValidationError::MissingField(field)), "{source}");
    }
}

#[test]
fn missing_input_source() {
    let record = JobRecord { input_source: None, ..inline_record() };
    assert_eq!(validate(&record), Err(ValidationError::MissingField("input_source")));
}

#[test]
fn unknown_input_source() {
    let record = JobRecord { input_source: Some("fasta_url".to_string()), ..inline_record() };
    assert!(matches!(
        validate(&record),
        Err(ValidationError::InvalidEnumValue { field: "input_source", value, .. })
            if value == "fasta_url"
    ));
}

#[test]
fn unknown_input_source_checked_before_dataset() {
    // an unknown discriminator is reported even when the dataset already exists
    let record = JobRecord {
        input_source: Some("bogus".to_string()),
        prepare_dataset: Some(false),
        ..inline_record()
    };
    assert!(matches!(
        validate(&record),
        Err(ValidationError::InvalidEnumValue { field: "input_source", .. })
    ));
}

#[test]
fn remote_id_prefix_is_stripped_once() -> Result<(), Report> {
    let record = JobRecord {
        input_source: Some("fasta_file_id".to_string()),
        input_fasta_file_id: Some(" ws:/user@bvbrc/home/flu.fasta ".to_string()),
        ..inline_record()
    };
    let config = validate(&record)?;
    assert_eq!(
        config.input_source(),
        Some(&InputSource::RemoteFileId("/user@bvbrc/home/flu.fasta".to_string()))
    );
    Ok(())
}

#[test]
fn local_file_source() -> Result<(), Report> {
    let record = JobRecord {
        input_source: Some("fasta_file".to_string()),
        input_fasta_file: Some("data/flu.fasta".to_string()),
        ..inline_record()
    };
    let config = validate(&record)?;
    assert_eq!(
        config.input_source(),
        Some(&InputSource::LocalFile(PathBuf::from("data/flu.fasta")))
    );
    Ok(())
}

#[test]
fn existing_dataset() -> Result<(), Report> {
    let record = JobRecord {
        input_source: Some("prepared_files".to_string()),
        input_existing_directory: Some("ws:/user@bvbrc/home/prepared".to_string()),
        prepare_dataset: Some(false),
        ..inline_record()
    };
    let config = validate(&record)?;
    assert!(!config.prepare_dataset());
    assert_eq!(config.input_source(), None);
    assert_eq!(
        config.existing_dataset_directory(),
        Some(PathBuf::from("/user@bvbrc/home/prepared").as_path())
    );
    Ok(())
}

#[test]
fn existing_dataset_requires_directory() {
    for directory in [None, Some(""), Some("  "), Some("ws:")] {
        let record = JobRecord {
            input_source: Some("prepared_files".to_string()),
            input_existing_directory: directory.map(String::from),
            prepare_dataset: Some(false),
            ..inline_record()
        };
        assert_eq!(
            validate(&record),
            Err(ValidationError::MissingField("input_existing_directory")),
            "{directory:?}"
        );
    }
}

#[test]
fn existing_dataset_rejects_fasta_sources() {
    for source in ["fasta_data", "fasta_file", "fasta_file_id"] {
        let record = JobRecord {
            input_source: Some(source.to_string()),
            input_existing_directory: Some("/prepared".to_string()),
            prepare_dataset: Some(false),
            ..inline_record()
        };
        assert_eq!(
            validate(&record),
            Err(ValidationError::IncompatibleInputSource {
                source_name: source.to_string(),
                prepare_dataset: false
            }),
            "{source}"
        );
    }
}

#[test]
fn existing_dataset_requires_input_source() {
    let record = JobRecord {
        input_source: None,
        input_existing_directory: Some("/prepared".to_string()),
        prepare_dataset: Some(false),
        ..inline_record()
    };
    assert_eq!(validate(&record), Err(ValidationError::MissingField("input_source")));
}

#[test]
fn prepared_files_needs_existing_dataset() {
    let record = JobRecord { input_source: Some("prepared_files".to_string()), ..inline_record() };
    assert_eq!(
        validate(&record),
        Err(ValidationError::IncompatibleInputSource {
            source_name: "prepared_files".to_string(),
            prepare_dataset: true
        })
    );
}

#[test]
fn method_required_and_known() {
    let record = JobRecord { method: None, ..inline_record() };
    assert_eq!(validate(&record), Err(ValidationError::MissingField("method")));

    let record = JobRecord { method: Some("MinCut".to_string()), ..inline_record() };
    let Err(ValidationError::InvalidEnumValue { field, value, expected }) = validate(&record)
    else {
        panic!("expected an invalid method");
    };
    assert_eq!(field, "method");
    assert_eq!(value, "MinCut");
    assert_eq!(expected, "local, mincut");
}

#[test]
fn inference_type_values() -> Result<(), Report> {
    let record = JobRecord { inference_type: Some("FastTree".to_string()), ..inline_record() };
    assert_eq!(validate(&record)?.inference_type, InferenceType::FastTree);

    let record = JobRecord { inference_type: Some("IQ-Tree".to_string()), ..inline_record() };
    assert_eq!(validate(&record)?.inference_type, InferenceType::IqTree);

    let record = JobRecord { inference_type: Some("RAxML".to_string()), ..inline_record() };
    assert!(matches!(
        validate(&record),
        Err(ValidationError::InvalidEnumValue { field: "inference_type", .. })
    ));
    Ok(())
}

#[test]
fn output_path_required() {
    let record = JobRecord { output_path: Some(" ".to_string()), ..inline_record() };
    assert_eq!(validate(&record), Err(ValidationError::MissingField("output_path")));
}

#[test]
fn invalid_reference_segment() {
    let record = JobRecord { ref_segment: Some("XX".to_string()), ..inline_record() };
    assert_eq!(validate(&record), Err(ValidationError::InvalidSegment("XX".to_string())));

    // comparison is case-sensitive
    let record = JobRecord { ref_segment: Some("ha".to_string()), ..inline_record() };
    assert_eq!(validate(&record), Err(ValidationError::InvalidSegment("ha".to_string())));
}

#[test]
fn reference_segment_trimmed() -> Result<(), Report> {
    let record = JobRecord { ref_segment: Some(" NA ".to_string()), ..inline_record() };
    assert_eq!(validate(&record)?.reference_segment, Segment::NA);
    Ok(())
}

#[test]
fn segment_list() -> Result<(), Report> {
    let record = JobRecord { segments: Some("NA, HA,PB2,HA".to_string()), ..inline_record() };
    assert_eq!(validate(&record)?.segments, vec![Segment::NA, Segment::HA, Segment::PB2]);

    let record = JobRecord { segments: Some("HA,H5,NA".to_string()), ..inline_record() };
    assert_eq!(validate(&record), Err(ValidationError::InvalidSegment("H5".to_string())));

    let record = JobRecord { segments: Some("HA,".to_string()), ..inline_record() };
    assert_eq!(validate(&record), Err(ValidationError::InvalidSegment(String::new())));
    Ok(())
}

#[test]
fn first_violation_wins() {
    // method, reference segment, and segments are all invalid: method is reported
    let record = JobRecord {
        method: Some("fast".to_string()),
        ref_segment: Some("XX".to_string()),
        segments: Some("YY".to_string()),
        ..inline_record()
    };
    assert!(matches!(
        validate(&record),
        Err(ValidationError::InvalidEnumValue { field: "method", .. })
    ));

    // output path before reference segment
    let record = JobRecord {
        output_path: None,
        ref_segment: Some("XX".to_string()),
        ..inline_record()
    };
    assert_eq!(validate(&record), Err(ValidationError::MissingField("output_path")));

    // reference segment before segment list
    let record = JobRecord {
        ref_segment: Some("XX".to_string()),
        segments: Some("YY".to_string()),
        ..inline_record()
    };
    assert_eq!(validate(&record), Err(ValidationError::InvalidSegment("XX".to_string())));
}

#[test]
fn match_mode_priority() -> Result<(), Report> {
    let record = JobRecord {
        match_on_strain: Some(true),
        match_on_epi: Some(true),
        match_on_regex: Some("^A/".to_string()),
        ..inline_record()
    };
    assert_eq!(validate(&record)?.match_mode, MatchMode::ByStrainName);

    let record = JobRecord { match_on_strain: Some(false), ..record };
    assert_eq!(validate(&record)?.match_mode, MatchMode::ByEpiId);

    let record = JobRecord { match_on_epi: None, ..record };
    assert_eq!(validate(&record)?.match_mode, MatchMode::ByRegex("^A/".to_string()));
    Ok(())
}

#[test]
fn flags_and_thresholds_pass_through() -> Result<(), Report> {
    let record = JobRecord {
        no_collapse: Some(true),
        equal_rates: Some(false),
        is_time_scaled: Some(true),
        deviation: Some(2.0),
        p_value: Some(0.001),
        clades_path: Some("/out/clades.tsv".to_string()),
        descriptor_path: Some("".to_string()),
        ..inline_record()
    };
    let config = validate(&record)?;
    assert!(config.no_collapse);
    assert!(!config.equal_rates);
    assert!(config.is_time_scaled);
    assert_eq!(config.deviation, Some(2.0));
    assert_eq!(config.p_value, Some(0.001));
    assert_eq!(config.clades_path, Some(PathBuf::from("/out/clades.tsv")));
    assert_eq!(config.descriptor_path, None);
    Ok(())
}

#[test]
fn read_job_file() -> Result<(), Report> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("jobdesc.json");
    std::fs::write(&path, serde_json::to_string(&inline_record())?)?;
    assert_eq!(JobRecord::read(&path)?, inline_record());

    std::fs::write(&path, "{ not json")?;
    assert!(JobRecord::read(&path).is_err());
    assert!(JobRecord::read(&dir.path().join("missing.json")).is_err());
    Ok(())
}
