use ironshard::testing::{assert_dir_empty, write_csv_lines, write_numbered_csv};
use ironshard::{AddColumn, Config, Identity, Record, ShardError, process_csv};
use std::fs;

#[test]
fn failing_row_aborts_without_output() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let work = tmp.path().join("work");
    fs::create_dir(&work)?;
    let src = write_csv_lines(tmp.path().join("in.csv"), "v", &["ok", "bad", "ok"])?;
    let dest = tmp.path().join("out.csv");

    let picky = |r: &mut Record| -> anyhow::Result<()> {
        if r.get("v") == Some("bad") {
            anyhow::bail!("refusing {:?}", r.get("v"));
        }
        Ok(())
    };
    let err = process_csv(&src, &dest, &picky, &Config::default().with_chunks(1).with_temp_dir(&work))
        .unwrap_err();

    match &err {
        ShardError::Transform { chunk, record, .. } => assert_eq!((*chunk, *record), (0, 2)),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.chunk_index(), Some(0));
    assert!(!dest.exists());
    assert_dir_empty(&work);
    Ok(())
}

#[test]
fn failure_in_one_of_many_chunks_cleans_everything() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let work = tmp.path().join("work");
    fs::create_dir(&work)?;
    let src = write_numbered_csv(tmp.path().join("in.csv"), 5_000)?;
    let dest = tmp.path().join("out.csv");

    let fail_late = |r: &mut Record| -> anyhow::Result<()> {
        if r.get("pos") == Some("4321") {
            anyhow::bail!("row 4321 is cursed");
        }
        Ok(())
    };
    for overlap in [true, false] {
        let cfg = Config::default()
            .with_chunks(16)
            .with_workers(4)
            .with_read_buffer(256)
            .with_overlap(overlap)
            .with_temp_dir(&work);
        let err = process_csv(&src, &dest, &fail_late, &cfg).unwrap_err();
        assert!(matches!(err, ShardError::Transform { .. }), "{err}");
        assert!(err.to_string().contains("cursed"));
        assert!(!dest.exists());
        assert_dir_empty(&work);
    }
    Ok(())
}

#[test]
fn existing_output_survives_a_failed_run() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = write_csv_lines(tmp.path().join("in.csv"), "v", &["1", "boom"])?;
    let dest = tmp.path().join("out.csv");
    fs::write(&dest, "previous\n")?;

    let strict = |r: &mut Record| -> anyhow::Result<()> {
        match r.get("v") {
            // The probe record carries an empty value.
            None | Some("") => Ok(()),
            Some(v) => {
                v.parse::<i64>()?;
                Ok(())
            }
        }
    };
    assert!(process_csv(&src, &dest, &strict, &Config::default()).is_err());
    assert_eq!(fs::read_to_string(&dest)?, "previous\n");
    Ok(())
}

#[test]
fn missing_and_empty_inputs_are_rejected() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let dest = tmp.path().join("out.csv");

    let missing = process_csv(tmp.path().join("nope.csv"), &dest, &AddColumn::default(), &Config::default())
        .unwrap_err();
    assert!(matches!(missing, ShardError::Io { .. }));

    let empty = tmp.path().join("empty.csv");
    fs::write(&empty, "")?;
    let err = process_csv(&empty, &dest, &AddColumn::default(), &Config::default()).unwrap_err();
    assert!(matches!(err, ShardError::EmptyInput { .. }));
    assert!(!dest.exists());
    Ok(())
}

#[test]
fn short_rows_are_padded_with_empty_values() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = write_csv_lines(tmp.path().join("in.csv"), "a,b", &["1,2", "3"])?;
    let dest = tmp.path().join("out.csv");
    let summary = process_csv(&src, &dest, &Identity, &Config::default().with_chunks(1))?;
    assert_eq!(fs::read_to_string(&dest)?, "a,b\n1,2\n3,\n");
    assert_eq!(summary.rows, 2);
    Ok(())
}

#[test]
fn rows_longer_than_the_header_are_rejected() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let work = tmp.path().join("work");
    fs::create_dir(&work)?;
    let src = write_csv_lines(tmp.path().join("in.csv"), "a,b", &["1,2", "3,4,5"])?;
    let dest = tmp.path().join("out.csv");
    let cfg = Config::default().with_chunks(1).with_temp_dir(&work);
    let err = process_csv(&src, &dest, &Identity, &cfg).unwrap_err();
    assert!(matches!(
        err,
        ShardError::ExtraValues { chunk: 0, record: 2, expected: 2, found: 3 }
    ));
    assert!(!dest.exists());
    assert_dir_empty(&work);
    Ok(())
}
