mod common;

use std::sync::Arc;

use anyhow::Result;
use common::{epl_header, sun_header};
use copyright_check::classify::{Classification, Classifier};
use copyright_check::copyright::{YearExpr, YearStyle};
use copyright_check::formats::{FormatRegistry, split_lines};
use copyright_check::repair::{RepairError, RepairOptions, RepairPlan, Repairer};
use copyright_check::templates::{LegacyKind, TemplateCatalog};

struct Fixture {
  formats: FormatRegistry,
  classifier: Classifier,
  repairer: Repairer,
}

impl Fixture {
  fn new(options: RepairOptions) -> Result<Self> {
    let catalog = Arc::new(TemplateCatalog::bundled()?);
    Ok(Self {
      formats: FormatRegistry::new(),
      classifier: Classifier::new(Arc::clone(&catalog), false),
      repairer: Repairer::new(catalog, options),
    })
  }

  fn classify(&self, file_name: &str, content: &str) -> Classification {
    let format = self.formats.select(file_name, content);
    let extracted = format.extract(&split_lines(content));
    self.classifier.classify(extracted.text.as_deref(), format.match_mode())
  }

  fn repair(&self, file_name: &str, content: &str, plan: &RepairPlan) -> Result<String, RepairError> {
    let format = self.formats.select(file_name, content);
    self.repairer.apply(format, content, plan)
  }
}

fn insert_header(year: &str) -> RepairPlan {
  RepairPlan::ReplaceFull {
    target_year: year.to_string(),
    existing: None,
  }
}

#[test]
fn test_inserted_header_classifies_as_good_in_every_format() -> Result<()> {
  let fixture = Fixture::new(RepairOptions::default())?;
  let files = [
    ("A.java", "package a;\n\npublic class A {}\n"),
    ("style.css", "body { margin: 0; }\n"),
    ("build.properties", "key=value\n"),
    ("run.sh", "#!/bin/sh\necho hi\n"),
    ("pom.xml", "<?xml version=\"1.0\"?>\n<project/>\n"),
    ("index.html", "<html>\n<body/>\n</html>\n"),
    ("page.jsp", "<%@ page contentType=\"text/html\" %>\n"),
    ("run.bat", "@echo off\r\nset X=1\r\n"),
    ("README.md", "# Title\n\nText.\n"),
    ("guide.adoc", "= Guide\n\nText.\n"),
  ];

  for (name, content) in files {
    assert_eq!(fixture.classify(name, content), Classification::Missing, "{name} before repair");
    let repaired = fixture.repair(name, content, &insert_header("2021"))?;
    assert_eq!(
      fixture.classify(name, &repaired),
      Classification::Good(YearExpr::new("2021")),
      "{name} after repair:\n{repaired}"
    );
    if name.ends_with(".bat") {
      assert!(!repaired.replace("\r\n", "").contains('\n'), "{name} has bare LF line endings");
    }
  }
  Ok(())
}

#[test]
fn test_bat_files_are_written_with_crlf() -> Result<()> {
  let fixture = Fixture::new(RepairOptions::default())?;
  let content = "@echo off\nset X=1\n";

  let repaired = fixture.repair("build.bat", content, &insert_header("2021"))?;
  assert!(repaired.contains("\r\n"));
  assert!(!repaired.replace("\r\n", "").contains('\n'));
  assert!(repaired.ends_with("set X=1\r\n"));
  assert_eq!(
    fixture.classify("build.bat", &repaired),
    Classification::Good(YearExpr::new("2021"))
  );
  Ok(())
}

#[test]
fn test_replaced_header_keeps_first_year() -> Result<()> {
  let fixture = Fixture::new(RepairOptions::default())?;
  let content = format!("{}\npublic class C {{}}\n", sun_header("2008"));
  assert_eq!(
    fixture.classify("C.java", &content),
    Classification::WrongKnown(LegacyKind::Sun)
  );

  let format = fixture.formats.select("C.java", &content);
  let existing = format.extract(&split_lines(&content)).text;
  let repaired = fixture.repair(
    "C.java",
    &content,
    &RepairPlan::ReplaceFull {
      target_year: "2021".to_string(),
      existing,
    },
  )?;

  assert_eq!(
    fixture.classify("C.java", &repaired),
    Classification::Good(YearExpr::new("2008, 2021"))
  );
  assert!(repaired.ends_with("\npublic class C {}\n"));
  Ok(())
}

#[test]
fn test_update_date_only_changes_year_token() -> Result<()> {
  let fixture = Fixture::new(RepairOptions::default())?;
  let content = format!("{}\npackage b;\n\npublic class B {{}}\n", epl_header("2018")).replace('\n', "\r\n");

  let repaired = fixture.repair(
    "B.java",
    &content,
    &RepairPlan::UpdateDateOnly {
      target_year: "2021".to_string(),
    },
  )?;
  assert_eq!(repaired, content.replacen("2018", "2018, 2021", 1));
  Ok(())
}

#[test]
fn test_update_date_only_with_dash_collapses_range() -> Result<()> {
  let fixture = Fixture::new(RepairOptions {
    style: YearStyle::Dash,
    ..RepairOptions::default()
  })?;
  let content = format!("{}\npublic class B {{}}\n", epl_header("2010-2015"));

  let repaired = fixture.repair(
    "B.java",
    &content,
    &RepairPlan::UpdateDateOnly {
      target_year: "2021".to_string(),
    },
  )?;
  assert_eq!(repaired, content.replacen("2010-2015", "2010-2021", 1));
  Ok(())
}

#[test]
fn test_properties_year_update_keeps_shebang() -> Result<()> {
  let fixture = Fixture::new(RepairOptions::default())?;
  let content = "#!/bin/sh\n#\n# Copyright (c) 2017 Oracle and/or its affiliates. All rights reserved.\n#\n\necho hi\n";

  let repaired = fixture.repair(
    "run.sh",
    content,
    &RepairPlan::UpdateDateOnly {
      target_year: "2021".to_string(),
    },
  )?;
  assert_eq!(repaired, content.replace("2017", "2017, 2021"));
  Ok(())
}

#[test]
fn test_extraction_is_idempotent() -> Result<()> {
  let fixture = Fixture::new(RepairOptions::default())?;
  let repaired = fixture.repair("A.java", "public class A {}\n", &insert_header("2021"))?;

  let format = fixture.formats.select("A.java", &repaired);
  let first = format.extract(&split_lines(&repaired));
  let second = format.extract(&split_lines(&repaired));
  assert_eq!(first, second);

  // Repairing a file that is already good with the same year changes nothing.
  let again = fixture.repair(
    "A.java",
    &repaired,
    &RepairPlan::UpdateDateOnly {
      target_year: "2021".to_string(),
    },
  )?;
  assert_eq!(again, repaired);
  Ok(())
}

#[test]
fn test_blank_file_cannot_be_repaired() -> Result<()> {
  let fixture = Fixture::new(RepairOptions::default())?;
  let result = fixture.repair(
    "A.java",
    "\n\n\n",
    &RepairPlan::UpdateDateOnly {
      target_year: "2021".to_string(),
    },
  );
  assert!(matches!(result, Err(RepairError::NoContent)));
  assert_eq!(
    result.map_err(|err| err.to_string()).err().as_deref(),
    Some("NO CONTENT, repair failed")
  );
  Ok(())
}
