use assert_cmd::Command;
use predicates::str;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

// Two internal nodes over four sites: classes {0,1} {2,3} from the first row,
// {0,2} {1,3} from the second. Every site touches two classes.
const GRID: &str = "1 2\npartition_0 4\n0 0 1 1\n0 1 0 1\n";

fn write_repeats(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("input.repeats");
    fs::write(&path, contents).unwrap();
    path
}

fn stdout_lines(output: &[u8]) -> Vec<String> {
    String::from_utf8(output.to_vec())
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("judicious").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_args() {
    let mut cmd = Command::cargo_bin("judicious").unwrap();
    cmd.assert().failure().stderr(str::contains("Usage"));
}

#[test]
fn test_partition_writes_one_block_per_k() {
    let temp_dir = tempdir().unwrap();
    let repeats = write_repeats(temp_dir.path(), GRID);

    let output = Command::cargo_bin("judicious")
        .unwrap()
        .arg("partition")
        .arg(&repeats)
        .arg("4,2,4")
        .arg("-q")
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines = stdout_lines(&output.stdout);
    assert_eq!(
        &lines[..lines.len() - 1],
        &[
            "4",
            "CPU1 1",
            "partition_0 1 0",
            "CPU2 1",
            "partition_0 1 1",
            "CPU3 1",
            "partition_0 1 2",
            "CPU4 1",
            "partition_0 1 3",
            "2",
            "CPU1 1",
            "partition_0 2 0 2",
            "CPU2 1",
            "partition_0 2 1 3",
        ]
    );
    let last = lines.last().unwrap();
    assert!(last.starts_with("Runtime: ") && last.ends_with("ms"));
}

#[test]
fn test_partition_to_file_and_stats() {
    let temp_dir = tempdir().unwrap();
    let repeats = write_repeats(temp_dir.path(), GRID);
    let ddf = temp_dir.path().join("out.ddf");

    Command::cargo_bin("judicious")
        .unwrap()
        .arg("partition")
        .arg(&repeats)
        .arg("2")
        .arg("-o")
        .arg(&ddf)
        .arg("-q")
        .assert()
        .success();
    assert!(ddf.exists());

    Command::cargo_bin("judicious")
        .unwrap()
        .arg("stats")
        .arg(&repeats)
        .arg(&ddf)
        .arg("-f")
        .arg("csv")
        .arg("-q")
        .assert()
        .success()
        .stdout("k,worker,sites,rcc\n2,1,2,3\n2,2,2,3\n2,ALL,4,6\n");
}

#[test]
fn test_stats_json() {
    let temp_dir = tempdir().unwrap();
    let repeats = write_repeats(temp_dir.path(), GRID);
    let ddf = temp_dir.path().join("naive.ddf");
    fs::write(&ddf, "1\nCPU1 1\npartition_0 4 0 1 2 3\n").unwrap();

    let output = Command::cargo_bin("judicious")
        .unwrap()
        .arg("stats")
        .arg(&repeats)
        .arg(&ddf)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["lower_bound"], 4);
    assert_eq!(report["distributions"][0]["worst_rcc"], 4);
    assert_eq!(report["distributions"][0]["exact_cover"], true);
}

#[test]
fn test_naive_strategy() {
    let temp_dir = tempdir().unwrap();
    let repeats = write_repeats(temp_dir.path(), GRID);

    let output = Command::cargo_bin("judicious")
        .unwrap()
        .arg("partition")
        .arg(&repeats)
        .arg("2")
        .arg("--strategy")
        .arg("naive")
        .arg("-q")
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines = stdout_lines(&output.stdout);
    assert_eq!(lines[2], "partition_0 2 0 1");
    assert_eq!(lines[4], "partition_0 2 2 3");
}

#[test]
fn test_split_by_proportions() {
    let temp_dir = tempdir().unwrap();
    let repeats = write_repeats(temp_dir.path(), GRID);

    let output = Command::cargo_bin("judicious")
        .unwrap()
        .arg("split")
        .arg(&repeats)
        .arg("0.5,0.5")
        .arg("-q")
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines = stdout_lines(&output.stdout);
    assert_eq!(
        &lines[..5],
        &["2", "CPU1 1", "partition_0 2 0 2", "CPU2 1", "partition_0 2 1 3"]
    );
    assert!(lines[5].starts_with("Runtime: "));
}

#[test]
fn test_invalid_worker_count() {
    let temp_dir = tempdir().unwrap();
    let repeats = write_repeats(temp_dir.path(), GRID);

    Command::cargo_bin("judicious")
        .unwrap()
        .arg("partition")
        .arg(&repeats)
        .arg("2,5")
        .arg("-q")
        .assert()
        .failure()
        .stdout("")
        .stderr(str::contains("Invalid worker count k=5"));
}

#[test]
fn test_ragged_row_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let repeats = write_repeats(temp_dir.path(), "1 2\npartition_0 4\n0 0 1 1\n0 1 0\n");

    Command::cargo_bin("judicious")
        .unwrap()
        .arg("partition")
        .arg(&repeats)
        .arg("2")
        .assert()
        .failure()
        .stderr(str::contains("line 4"));
}

#[test]
fn test_missing_partition() {
    let temp_dir = tempdir().unwrap();
    let repeats = write_repeats(temp_dir.path(), GRID);

    Command::cargo_bin("judicious")
        .unwrap()
        .arg("partition")
        .arg(&repeats)
        .arg("2")
        .arg("-p")
        .arg("3")
        .assert()
        .failure()
        .stderr(str::contains("Partition 3 not found"));
}

#[test]
fn test_same_output_on_any_thread_count() {
    let temp_dir = tempdir().unwrap();
    // Three internal nodes over twelve sites, labels site / (node + 1) mod 3
    let mut contents = String::from("1 3\npartition_0 12\n");
    for node in 0..3 {
        let row: Vec<String> = (0..12).map(|site| ((site / (node + 1)) % 3).to_string()).collect();
        contents.push_str(&row.join(" "));
        contents.push('\n');
    }
    let repeats = write_repeats(temp_dir.path(), &contents);

    let run = |threads: &str| {
        let output = Command::cargo_bin("judicious")
            .unwrap()
            .arg("partition")
            .arg(&repeats)
            .arg("1,2,3,5,12")
            .arg("-t")
            .arg(threads)
            .arg("-q")
            .output()
            .unwrap();
        assert!(output.status.success());
        stdout_lines(&output.stdout)
            .into_iter()
            .filter(|line| !line.starts_with("Runtime:"))
            .collect::<Vec<_>>()
    };
    let single = run("1");
    assert_eq!(single[0], "1");
    assert_eq!(single, run("4"));
}

#[test]
fn test_stats_output_path_error() {
    let temp_dir = tempdir().unwrap();
    let repeats = write_repeats(temp_dir.path(), GRID);
    let ddf = temp_dir.path().join("one.ddf");
    fs::write(&ddf, "1\nCPU1 1\npartition_0 4 0 1 2 3\n").unwrap();

    Command::cargo_bin("judicious")
        .unwrap()
        .arg("stats")
        .arg(&repeats)
        .arg(&ddf)
        .arg("-o")
        .arg(temp_dir.path().join("missing").join("report.txt"))
        .arg("-q")
        .assert()
        .failure()
        .stderr(str::contains("Failed to create output file"));
}

#[test]
fn test_missing_file() {
    Command::cargo_bin("judicious")
        .unwrap()
        .arg("partition")
        .arg("does-not-exist.repeats")
        .arg("2")
        .assert()
        .failure()
        .stderr(str::contains("Failed to load repeats file"));
}
