//! Checkpoint files for the search graph.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use qg_tree::SearchGraph;

use crate::policy::PolicyError;

/// Load a graph from `path`. A missing file is not an error: it means "start fresh".
pub fn read_checkpoint(path: &Path) -> Result<Option<SearchGraph>, PolicyError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(SearchGraph::deserialize(&text)?))
}

/// Write `graph` to `path` via a temp file and rename. Last writer wins.
pub fn write_checkpoint_atomic(path: &Path, graph: &SearchGraph) -> Result<(), PolicyError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, graph.serialize()?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// `q_tree.json` + `id` -> `q_tree-<id>.json`.
pub fn fork_filename(filename: &str, id: &str) -> String {
    let p = Path::new(filename);
    let stem = p
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    match p.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}-{id}.{ext}"),
        None => format!("{stem}-{id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qg_core::{Goal, Language, ProgressState, ProofAction, ProofEnvInfo, ProofState};
    use qg_tree::{EdgeInfo, StateType};

    #[test]
    fn fork_filename_inserts_id_before_extension() {
        assert_eq!(fork_filename("q_tree.json", "abc"), "q_tree-abc.json");
        assert_eq!(fork_filename("q_tree", "abc"), "q_tree-abc");
        assert_eq!(fork_filename("a.b.json", "x"), "a.b-x.json");
    }

    #[test]
    fn missing_checkpoint_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let got = read_checkpoint(&dir.path().join("absent.json")).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn write_creates_dir_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("q_tree.json");
        let mut g = SearchGraph::new();
        let s = ProofState::new(Language::Lean, vec![Goal::new("1 + 1 = 2")]);
        g.add(
            &s,
            &ProofAction::run_tactic(Language::Lean, ["norm_num"]),
            &ProofState::finished(Language::Lean),
            EdgeInfo::new(
                1.0,
                true,
                ProofEnvInfo::new(ProgressState::Done),
                StateType::Discovered,
            ),
        );
        write_checkpoint_atomic(&path, &g).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("nested").join("q_tree.json.tmp").exists());

        let back = read_checkpoint(&path).unwrap().unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn corrupt_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q_tree.json");
        fs::write(&path, b"{not valid json").unwrap();
        assert!(matches!(read_checkpoint(&path), Err(PolicyError::Tree(_))));
    }
}
