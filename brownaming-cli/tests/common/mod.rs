#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn brownaming_cmd() -> Command {
    let mut cmd = Command::cargo_bin("brownaming").unwrap();
    cmd.env_remove("BROWNAMING_LOG").env_remove("LOCAL_DB_PATH");
    cmd
}

/// Scratch home, local database and runs directory for one test
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let env = Self {
            temp_dir: TempDir::new()?,
        };
        fs::create_dir_all(env.home())?;
        fs::create_dir_all(env.taxonomy_dir())?;
        Ok(env)
    }

    pub fn home(&self) -> PathBuf {
        self.temp_dir.path().join("home")
    }

    pub fn local_db(&self) -> PathBuf {
        self.temp_dir.path().join("db")
    }

    pub fn taxonomy_dir(&self) -> PathBuf {
        self.local_db().join("taxonomy")
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.temp_dir.path().join("runs")
    }

    /// Command with the home, database and runs directory of this environment
    pub fn cmd(&self) -> Command {
        let mut cmd = brownaming_cmd();
        cmd.env("BROWNAMING_HOME", self.home())
            .arg("--local-db")
            .arg(self.local_db())
            .arg("--runs-dir")
            .arg(self.runs_dir());
        cmd
    }

    pub fn create_input_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// 131567 -> 9604 -> 9605 -> 9606, written as lookup tables
    pub fn write_taxonomy(&self) -> Result<()> {
        let dir = self.taxonomy_dir();
        fs::write(
            dir.join("parent.json"),
            r#"{"131567": 1, "9604": 131567, "9605": 9604, "9606": 9605}"#,
        )?;
        fs::write(
            dir.join("children.json"),
            r#"{"1": [131567], "131567": [9604], "9604": [9605], "9605": [9606]}"#,
        )?;
        fs::write(
            dir.join("rank.json"),
            r#"{"1": "no rank", "131567": "cellular root", "9604": "family", "9605": "genus", "9606": "species"}"#,
        )?;
        fs::write(
            dir.join("taxid2scientific_name.json"),
            r#"{"1": "root", "131567": "cellular organisms", "9604": "Hominidae", "9605": "Homo", "9606": "Homo sapiens"}"#,
        )?;
        Ok(())
    }

    pub fn write_dbsize_table(&self) -> Result<()> {
        fs::write(
            self.taxonomy_dir().join("taxid2dbsize.json"),
            r#"{
                "9606": {"swissprot": 20000, "total": 200000},
                "9605": {"swissprot": 20100, "total": 260000},
                "9604": {"swissprot": 21000, "total": 900000},
                "131567": {"swissprot": 500000, "total": 90000000}
            }"#,
        )?;
        Ok(())
    }

    pub fn write_ncbi_dumps(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(
            dir.join("nodes.dmp"),
            "1\t|\t1\t|\tno rank\t|\t\t|\n\
             131567\t|\t1\t|\tcellular root\t|\t\t|\n\
             9606\t|\t131567\t|\tspecies\t|\tHS\t|\n",
        )?;
        fs::write(
            dir.join("names.dmp"),
            "1\t|\troot\t|\t\t|\tscientific name\t|\n\
             131567\t|\tcellular organisms\t|\t\t|\tscientific name\t|\n\
             9606\t|\tHomo sapiens\t|\t\t|\tscientific name\t|\n\
             9606\t|\thuman\t|\t\t|\tgenbank common name\t|\n",
        )?;
        Ok(())
    }
}

pub fn create_protein_fasta(n: usize) -> String {
    let mut content = String::new();
    for i in 1..=n {
        content.push_str(&format!(">prot{} hypothetical protein\n", i));
        content.push_str("mkvlaagivallllaagcssqalpv\n");
    }
    content
}
