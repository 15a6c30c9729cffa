use ironshard::testing::{
    assert_dir_empty, assert_monotonic_column, assert_rows_equal, read_rows, write_csv_lines,
    write_numbered_csv,
};
use ironshard::{AddColumn, Config, Identity, Record, process_csv};
use std::fs;
use std::path::Path;

fn work_dir(root: &Path) -> anyhow::Result<std::path::PathBuf> {
    let work = root.join("work");
    fs::create_dir_all(&work)?;
    Ok(work)
}

#[test]
fn identity_round_trip_preserves_rows_and_order() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let work = work_dir(tmp.path())?;
    let src = write_numbered_csv(tmp.path().join("in.csv"), 2_000)?;
    let dest = tmp.path().join("out.csv");

    let cfg = Config::default()
        .with_chunks(6)
        .with_workers(3)
        .with_read_buffer(512)
        .with_temp_dir(&work);
    let summary = process_csv(&src, &dest, &Identity, &cfg)?;

    let (in_header, in_rows) = read_rows(&src)?;
    let (out_header, out_rows) = read_rows(&dest)?;
    assert_eq!(out_header, in_header);
    assert_rows_equal(&out_rows, &in_rows);
    assert_eq!(fs::read(&dest)?, fs::read(&src)?);
    assert_eq!(summary.rows, 2_000);
    assert_dir_empty(&work);
    Ok(())
}

#[test]
fn order_survives_any_worker_count() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let work = work_dir(tmp.path())?;
    let src = write_numbered_csv(tmp.path().join("in.csv"), 3_000)?;

    // Later rows finish first, so workers complete out of order.
    let jitter = |r: &mut Record| -> anyhow::Result<()> {
        if let Some(pos) = r.get("pos").and_then(|p| p.parse::<u64>().ok()) {
            if pos % 500 == 0 {
                std::thread::sleep(std::time::Duration::from_millis(5 * (6 - pos / 500)));
            }
        }
        Ok(())
    };

    for workers in [1, 2, 4, 16] {
        let dest = tmp.path().join(format!("out-{workers}.csv"));
        let cfg = Config::default()
            .with_chunks(12)
            .with_workers(workers)
            .with_read_buffer(128)
            .with_temp_dir(&work);
        process_csv(&src, &dest, &jitter, &cfg)?;
        let (header, rows) = read_rows(&dest)?;
        assert_eq!(rows.len(), 3_000);
        assert_monotonic_column(&header, &rows, "pos");
        assert_dir_empty(&work);
    }
    Ok(())
}

#[test]
fn add_column_appends_to_header_and_every_row() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = write_numbered_csv(tmp.path().join("in.csv"), 400)?;
    let dest = tmp.path().join("out.csv");
    let cfg = Config::default().with_chunks(5).with_temp_dir(work_dir(tmp.path())?);

    let summary = process_csv(&src, &dest, &AddColumn::default(), &cfg)?;

    let (header, rows) = read_rows(&dest)?;
    assert_eq!(header, vec!["pos", "name", "amount", "new_column"]);
    assert_eq!(summary.output_header, header);
    assert!(rows.iter().all(|r| r[3] == "default_value"));
    assert_monotonic_column(&header, &rows, "pos");
    Ok(())
}

#[test]
fn dropped_and_added_fields_follow_probe_order() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = write_csv_lines(tmp.path().join("in.csv"), "a,b,c", &["1,2,3", "4,5,6"])?;
    let dest = tmp.path().join("out.csv");
    let reshape = |r: &mut Record| -> anyhow::Result<()> {
        let b = r.remove("b").unwrap_or_default();
        r.set("sum", b.clone());
        r.set("b_again", b);
        Ok(())
    };
    process_csv(&src, &dest, &reshape, &Config::default().with_chunks(2))?;
    assert_eq!(fs::read_to_string(&dest)?, "a,c,sum,b_again\n1,3,2,2\n4,6,5,5\n");
    Ok(())
}

#[test]
fn header_only_input_gives_header_only_output() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let work = work_dir(tmp.path())?;
    let src = write_csv_lines(tmp.path().join("in.csv"), "x,y", &[])?;
    let dest = tmp.path().join("out.csv");

    let cfg = Config::default().with_chunks(4).with_temp_dir(&work);
    let summary = process_csv(&src, &dest, &AddColumn::new("z", "0"), &cfg)?;

    assert_eq!(fs::read_to_string(&dest)?, "x,y,z\n");
    assert_eq!(summary.rows, 0);
    assert_eq!(summary.chunks, 4);
    assert_dir_empty(&work);
    Ok(())
}

#[test]
fn fewer_records_than_chunks_is_fine() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = write_csv_lines(tmp.path().join("in.csv"), "k", &["a", "b", "c"])?;
    let dest = tmp.path().join("out.csv");
    let cfg = Config::default()
        .with_chunks(10)
        .with_read_buffer(1)
        .with_temp_dir(work_dir(tmp.path())?);
    process_csv(&src, &dest, &Identity, &cfg)?;
    assert_eq!(fs::read_to_string(&dest)?, "k\na\nb\nc\n");
    Ok(())
}

#[test]
fn quoted_fields_without_newlines_pass_through() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = write_csv_lines(
        tmp.path().join("in.csv"),
        "id,note",
        &["1,\"hello, world\"", "2,\"say \"\"hi\"\"\"", "3,plain"],
    )?;
    let dest = tmp.path().join("out.csv");
    process_csv(&src, &dest, &Identity, &Config::default().with_chunks(3).with_read_buffer(4))?;
    let (_, rows) = read_rows(&dest)?;
    assert_eq!(rows[0][1], "hello, world");
    assert_eq!(rows[1][1], "say \"hi\"");
    assert_eq!(rows[2][1], "plain");
    Ok(())
}
