/*
 * walk_integration.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Mailrow, mail archive steps for row pipelines.
 *
 * Mailrow is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Mailrow is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Mailrow.  If not, see <http://www.gnu.org/licenses/>.
 */


//! End-to-end: archives on disk walked by the mailbox input step, then the body of
//! every message written out by the binary file output step.

use std::fs;
use std::path::Path;

use mailrow_core::{
    create_step, ArchiveWalker, FieldMeta, MailrowConfig, Row, RowSchema, Step, StepKind,
    StepSettings, Transformation, Value, ValueType,
};

fn config() -> MailrowConfig {
    MailrowConfig {
        owner_addresses: vec!["me@example.com".to_string()],
        ..MailrowConfig::default()
    }
}

fn make_maildir(p: &Path) {
    for sub in ["cur", "new", "tmp"] {
        fs::create_dir_all(p.join(sub)).unwrap();
    }
}

/// INBOX with one read message, `.Work` with one new message from the owner.
fn maildir(root: &Path) {
    make_maildir(root);
    make_maildir(&root.join(".Work"));
    fs::write(
        root.join("cur").join("1400000000.M1P1.host,S=120:2,RS"),
        "From: Alice <alice@example.org>\r\n\
         To: me@example.com\r\n\
         Subject: inbox-hello\r\n\
         Date: Sun, 9 Mar 2014 17:30:00 +0000\r\n\
         \r\n\
         Hello there.\r\n",
    )
    .unwrap();
    fs::write(
        root.join(".Work").join("new").join("1400000100.M2P1.host"),
        "From: me@example.com\r\n\
         To: bob@example.org, carol@example.org\r\n\
         Subject: work-report\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         \r\n\
         Numbers attached.\r\n",
    )
    .unwrap();
}

fn export(path: &Path) {
    let doc = serde_json::json!({
        "root": {
            "name": "Personal Folders",
            "messages": [{"subject": "export-root", "body": "from the export", "descriptor_node_id": 2097188}]
        }
    });
    fs::write(path, serde_json::to_vec(&doc).unwrap()).unwrap();
}

fn input_schema() -> RowSchema {
    RowSchema::from_fields(vec![
        FieldMeta::new("archive", ValueType::String),
        FieldMeta::new("outdir", ValueType::String),
    ])
}

fn read_step(config: &MailrowConfig) -> Box<dyn Step> {
    let mut settings = StepSettings::default();
    settings.set("fileName", "archive");
    create_step(StepKind::PstInput, "Read mail", Some(&settings), config)
}

fn text(v: &Value) -> String {
    v.to_text().unwrap_or_default()
}

#[test]
fn maildir_and_export_through_both_steps() {
    let tmp = tempfile::tempdir().unwrap();
    let mail = tmp.path().join("Maildir");
    maildir(&mail);
    let json = tmp.path().join("export.json");
    export(&json);
    let outdir = tmp.path().join("bodies");

    let config = config();
    let input = input_schema();
    let rows: Vec<Row> = [&mail, &tmp.path().join("absent.pst"), &json]
        .iter()
        .map(|p| {
            vec![
                Value::from(p.to_string_lossy().into_owned()),
                Value::from(outdir.to_string_lossy().into_owned()),
            ]
        })
        .collect();

    let mut read = read_step(&config);
    let walked_schema = read.describe_output_schema(&input);
    let mut walked: Vec<Row> = Vec::new();
    let stats = Transformation::new(&config)
        .run(read.as_mut(), &input, rows, &mut walked)
        .unwrap();
    assert_eq!(stats.lines_read, 3);
    assert_eq!(stats.lines_written, 3);

    let col = |name: &str| walked_schema.index_of(name).unwrap();
    for row in &walked {
        walked_schema.validate(row).unwrap();
    }
    // Subfolders before their parent's own messages.
    let subjects: Vec<String> = walked.iter().map(|r| text(&r[col("subject")])).collect();
    assert_eq!(subjects, vec!["work-report", "inbox-hello", "export-root"]);

    let work = &walked[0];
    assert_eq!(work[col("folder")], Value::from("Work"));
    assert_eq!(work[col("from_me")], Value::Boolean(true));
    assert_eq!(work[col("read")], Value::Boolean(false));
    assert_eq!(work[col("number_of_recipients")], Value::Integer(2));

    let inbox = &walked[1];
    assert_eq!(inbox[col("folder")], Value::from("INBOX"));
    assert_eq!(inbox[col("read")], Value::Boolean(true));
    assert_eq!(inbox[col("replied")], Value::Boolean(true));
    assert_eq!(inbox[col("message_to_me")], Value::Boolean(true));
    assert_eq!(inbox[col("size")], Value::Integer(120));
    assert!(matches!(inbox[col("date")], Value::Timestamp(_)));
    assert!(matches!(inbox[col("descriptor_node_id")], Value::Integer(n) if n >= 0));

    let exported = &walked[2];
    assert_eq!(exported[col("descriptor_node_id")], Value::Integer(2097188));
    assert_eq!(exported[0], Value::from(json.to_string_lossy().into_owned()));

    let mut settings = StepSettings::default();
    settings.set("fileName", "subject");
    settings.set("folder", "outdir");
    settings.set("fileContent", "body");
    let mut write = create_step(StepKind::BinaryFileOutput, "Write bodies", Some(&settings), &config);
    let written_schema = write.describe_output_schema(&walked_schema);
    let mut written: Vec<Row> = Vec::new();
    Transformation::new(&config)
        .run(write.as_mut(), &walked_schema, walked, &mut written)
        .unwrap();

    assert_eq!(written.len(), 3);
    let created = written_schema.index_of("created").unwrap();
    assert!(written.iter().all(|r| r[created] == Value::Boolean(true)));
    let body = fs::read_to_string(outdir.join("work-report")).unwrap();
    assert!(body.contains("Numbers attached."));
    assert_eq!(fs::read_to_string(outdir.join("export-root")).unwrap(), "from the export");
}

#[test]
fn walker_is_lazy_and_rewalkable() {
    let tmp = tempfile::tempdir().unwrap();
    let mail = tmp.path().join("Maildir");
    maildir(&mail);
    let walker = ArchiveWalker::from_config(&config());
    let template = vec![Value::from("x")];

    let mut walk = walker.walk(&mail, template.clone()).unwrap();
    let first = walk.next().unwrap().unwrap();
    assert_eq!(first.len(), 1 + mailrow_core::MESSAGE_COLUMNS.len());
    drop(walk);

    let again: Vec<Row> = walker
        .walk(&mail, template)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(again.len(), 2);
    assert_eq!(again[0], first);
}
