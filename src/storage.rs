use crate::model::ScheduleTemplate;
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Charge une valeur depuis un support.
    fn load<T: DeserializeOwned>(&self) -> anyhow::Result<T>;
    /// Sauvegarde de manière atomique.
    fn save<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonStorage {
    fn load<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn save<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(value)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        debug_event!(path = %self.path.display(), bytes = json.len(), "saved json");
        Ok(())
    }
}

/// Semaines types persistées dans un répertoire, un fichier `{id}.json` chacune.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    base_dir: PathBuf,
}

impl TemplateStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            base_dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_of(&self, id: u64) -> PathBuf {
        self.base_dir.join(format!("{id}.json"))
    }

    /// Enregistre le modèle ; un id nul reçoit le prochain id libre.
    pub fn save(&self, template: &mut ScheduleTemplate) -> anyhow::Result<PathBuf> {
        if template.name.trim().is_empty() {
            bail!("schedule template name cannot be empty");
        }
        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("creating template directory {}", self.base_dir.display())
        })?;
        if template.schedule_template_id == 0 {
            let last = self
                .list()?
                .iter()
                .map(|t| t.schedule_template_id)
                .max()
                .unwrap_or(0);
            template.schedule_template_id = last + 1;
        }
        let path = self.path_of(template.schedule_template_id);
        JsonStorage::open(&path)?.save(&*template)?;
        Ok(path)
    }

    pub fn load(&self, id: u64) -> anyhow::Result<ScheduleTemplate> {
        JsonStorage::open(self.path_of(id))?.load()
    }

    pub fn delete(&self, id: u64) -> anyhow::Result<()> {
        let path = self.path_of(id);
        fs::remove_file(&path).with_context(|| format!("deleting template {}", path.display()))
    }

    /// Modèles lisibles du répertoire, triés par id. Les fichiers invalides sont ignorés.
    pub fn list(&self) -> anyhow::Result<Vec<ScheduleTemplate>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match JsonStorage::open(&path)?.load::<ScheduleTemplate>() {
                Ok(template) => out.push(template),
                Err(_err) => {
                    debug_event!(path = %path.display(), error = %_err, "skipping unreadable template");
                }
            }
        }
        out.sort_by_key(|t| t.schedule_template_id);
        Ok(out)
    }
}
