//! Reading and writing the pipeline's CSV tables on disk.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use exposure_common::{ActivityMatrix, ActivityRow, ExposureError, FollowEdge, RawFollowEdge, WeeklyRoster};
use exposure_tables::{follows, matrix, messages, raw, roster, users, TableError};

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn users_keep_nulls_and_ignore_profile_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "users.csv",
        "id,username,RePEc_id,followers_count,following_count,description\n\
         10,ann,pan1,120.0,40,\"economist, labor\"\n\
         11,bob,,7,,\n",
    );

    let loaded = users::read_users(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].repec_id.as_deref(), Some("pan1"));
    assert_eq!(loaded[0].followers_count, Some(120));
    assert_eq!(loaded[1].repec_id, None);
    assert_eq!(loaded[1].following_count, None);
}

#[test]
fn users_without_repec_column_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "users.csv", "id,followers_count,following_count\n1,2,3\n");

    let err = users::read_users(&path).unwrap_err();
    assert!(matches!(err, TableError::MissingColumn { column, .. } if column == "RePEc_id"));
}

#[test]
fn malformed_timestamp_aborts_message_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "tweets.csv",
        "id,RePEc_id,created_at\n1,pan1,2022-01-03 10:00:00+00:00\n2,pan2,yesterday\n",
    );

    let err = messages::read_messages(&path).unwrap_err();
    assert!(err.to_string().contains("yesterday"));
}

#[test]
fn messages_parse_pandas_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "tweets.csv",
        "RePEc_id,created_at,text\npan1,2022-01-03 10:00:00+00:00,hi\n,2022-01-04T00:00:00Z,anon\n",
    );

    let loaded = messages::read_messages(&path).unwrap();
    assert_eq!(loaded[0].created_at, Utc.with_ymd_and_hms(2022, 1, 3, 10, 0, 0).unwrap());
    assert_eq!(loaded[1].repec_id, None);
}

#[test]
fn follows_write_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/follows.csv");
    let edges = vec![FollowEdge {
        author_id: "1".into(),
        follower_id: "2".into(),
        repec_id: "pa".into(),
        follower_repec_id: "pb".into(),
    }];

    follows::write_follows(&path, &edges).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("author_id,follower_id,repec_id,follower_repec_id\n"));
    assert_eq!(follows::read_follows(&path).unwrap(), edges);
}

#[test]
fn raw_follows_trim_ids_and_ignore_extra_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "RePEc_following.csv",
        "follower_id,scraped_at,author_id
 2 ,2023-01-05,1
3,2023-01-05, 1
",
    );

    let edges = follows::read_raw_follows(&path).unwrap();
    assert_eq!(
        edges,
        vec![
            RawFollowEdge {
                author_id: "1".into(),
                follower_id: "2".into(),
            },
            RawFollowEdge {
                author_id: "1".into(),
                follower_id: "3".into(),
            },
        ]
    );
}

#[test]
fn raw_follows_without_follower_column_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "RePEc_following.csv", "author_id
1
");

    let err = follows::read_raw_follows(&path).unwrap_err();
    assert!(matches!(err, TableError::MissingColumn { column, .. } if column == "follower_id"));
}

#[test]
fn empty_follow_graph_still_has_a_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("follows.csv");

    follows::write_follows(&path, &[]).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "author_id,follower_id,repec_id,follower_repec_id\n"
    );
    assert!(follows::read_follows(&path).unwrap().is_empty());
}

#[test]
fn roster_week_zero_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "roster.csv",
        "week,repec_users\n0,\"[\"\"pa\"\"]\"\n1,[]\n",
    );

    let err = roster::read_roster(&path).unwrap_err();
    assert!(matches!(
        err,
        TableError::Value(ExposureError::Number { column, value }) if column == "week" && value == "0"
    ));
}

#[test]
fn roster_with_gaps_reads_back_dense() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "roster.csv",
        "week,repec_users\n1,\"['pa', 'pb']\"\n3,\"[\"\"pc\"\"]\"\n",
    );

    let loaded = roster::read_roster(&path).unwrap();
    assert_eq!(loaded.max_week(), 3);
    assert_eq!(loaded.week(2), Some(&BTreeSet::new()));
    assert!(loaded.contains(1, "pb"));
    assert!(loaded.contains(3, "pc"));
}

#[test]
fn roster_write_uses_json_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.csv");
    let mut weeks = std::collections::BTreeMap::new();
    weeks.insert(1, ["pb".to_string(), "pa".to_string()].into_iter().collect());
    let written = WeeklyRoster::dense(2, weeks);

    roster::write_roster(&path, &written).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "week,repec_users\n1,\"[\"\"pa\"\",\"\"pb\"\"]\"\n2,[]\n");
    assert_eq!(roster::read_roster(&path).unwrap(), written);
}

#[test]
fn matrix_writes_fixed_columns_then_weeks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mentions.csv");
    let m = ActivityMatrix {
        weeks: 2,
        rows: vec![
            ActivityRow {
                author_id: "1".into(),
                repec_id: Some("pa".into()),
                number_of_followers: Some(100),
                following_count: Some(50),
                cells: vec![true, false],
            },
            ActivityRow {
                author_id: "2".into(),
                repec_id: None,
                number_of_followers: None,
                following_count: Some(3),
                cells: vec![false, false],
            },
        ],
    };

    matrix::write_matrix(&path, &m).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "author_id,repec_id,number_of_followers,following_count,week1,week2\n\
         1,pa,100,50,1,0\n\
         2,,,3,0,0\n"
    );
}

#[test]
fn raw_tables_pass_unknown_columns_through() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "in.csv", "a,b,c\n1,\"x, y\",3\n");
    let output = dir.path().join("out.csv");

    let table = raw::read_table(&input).unwrap();
    raw::write_table(&output, &table).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "a,b,c\n1,\"x, y\",3\n");
}
