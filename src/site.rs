//! Site defaults applied at the end of every gated run.
//!
//! These steps are not version-gated. Each one checks its own precondition,
//! so repeating them is harmless:
//! - the site icon is uploaded only while `site_icon` is unset
//! - the home page is pinned only when the stored front-page options differ

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::store::{OptionStore, StoreError};

pub const SITE_ICON_KEY: &str = "site_icon";
pub const HOME_PAGE_ID_KEY: &str = "home__page_id";
pub const PAGE_ON_FRONT_KEY: &str = "page_on_front";
pub const SHOW_ON_FRONT_KEY: &str = "show_on_front";

/// Page identifier used for the landing page.
pub type PageId = u64;

/// Parse a stored page id. Blank or non-numeric values are `None`.
pub fn parse_page_id(raw: &str) -> Option<PageId> {
    raw.trim().parse::<PageId>().ok()
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Asset not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to copy asset {} into {}: {source}", path.display(), dir.display())]
    Copy {
        path: PathBuf,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Turns a local file into a stored asset reference.
pub trait AssetUploader {
    fn upload(&self, path: &Path) -> Result<String, UploadError>;
}

/// Uploader that copies assets into a directory under a unique name.
#[derive(Debug, Clone)]
pub struct UploadDir {
    dir: PathBuf,
}

impl UploadDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<stem>-<timestamp>[-n].<ext>`, not yet present in the directory.
    fn unique_name(&self, path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "asset".to_string());
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S%3f");

        let mut name = format!("{}-{}{}", stem, stamp, ext);
        let mut n = 1;
        while self.dir.join(&name).exists() {
            name = format!("{}-{}-{}{}", stem, stamp, n, ext);
            n += 1;
        }
        name
    }
}

impl AssetUploader for UploadDir {
    fn upload(&self, path: &Path) -> Result<String, UploadError> {
        if !path.is_file() {
            return Err(UploadError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let copy_err = |source| UploadError::Copy {
            path: path.to_path_buf(),
            dir: self.dir.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(copy_err)?;
        let name = self.unique_name(path);
        fs::copy(path, self.dir.join(&name)).map_err(copy_err)?;
        Ok(name)
    }
}

/// What happened to the site icon during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconOutcome {
    /// An icon was already configured
    AlreadySet,
    /// No default icon is configured or the file is missing
    NoDefault,
    /// The default icon was uploaded and stored
    Uploaded,
    /// Upload failed; retried on the next run
    UploadFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteReport {
    pub icon: IconOutcome,
    /// True if the front-page options were rewritten
    pub home_page_pinned: bool,
}

/// Default icon and landing page enforced after each gated run.
pub struct SiteMaintenance {
    icon: Option<PathBuf>,
    home_page: Option<PageId>,
    uploader: Box<dyn AssetUploader>,
}

impl SiteMaintenance {
    pub fn new(uploader: impl AssetUploader + 'static) -> Self {
        Self {
            icon: None,
            home_page: None,
            uploader: Box::new(uploader),
        }
    }

    /// Icon file uploaded when the site has none.
    pub fn with_icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.icon = Some(path.into());
        self
    }

    /// Landing page to pin. Without one, the `home__page_id` option is used.
    pub fn with_home_page(mut self, id: PageId) -> Self {
        self.home_page = Some(id);
        self
    }

    pub fn apply<S: OptionStore + ?Sized>(&self, store: &mut S) -> Result<SiteReport, StoreError> {
        Ok(SiteReport {
            icon: self.ensure_site_icon(store)?,
            home_page_pinned: self.pin_home_page(store)?,
        })
    }

    fn ensure_site_icon<S: OptionStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<IconOutcome, StoreError> {
        if let Some(current) = store.get_option(SITE_ICON_KEY)? {
            let current = current.trim();
            if !current.is_empty() && current != "0" {
                return Ok(IconOutcome::AlreadySet);
            }
        }

        let icon = match &self.icon {
            Some(icon) if icon.is_file() => icon,
            _ => return Ok(IconOutcome::NoDefault),
        };

        match self.uploader.upload(icon) {
            Ok(asset) => {
                store.update_option(SITE_ICON_KEY, &asset)?;
                info!(asset = %asset, "site icon set");
                Ok(IconOutcome::Uploaded)
            }
            Err(e) => {
                warn!(error = %e, "site icon upload failed, will retry next run");
                Ok(IconOutcome::UploadFailed)
            }
        }
    }

    fn pin_home_page<S: OptionStore + ?Sized>(&self, store: &mut S) -> Result<bool, StoreError> {
        let page = match self.home_page {
            Some(page) => page,
            None => match store
                .get_option(HOME_PAGE_ID_KEY)?
                .as_deref()
                .and_then(parse_page_id)
            {
                Some(page) => page,
                None => return Ok(false),
            },
        };
        let page = page.to_string();

        let on_front = store.get_option(PAGE_ON_FRONT_KEY)?;
        let show = store.get_option(SHOW_ON_FRONT_KEY)?;
        if show.as_deref() == Some("page") && on_front.as_deref().map(str::trim) == Some(page.as_str())
        {
            debug!(page = %page, "home page already pinned");
            return Ok(false);
        }

        store.update_option(PAGE_ON_FRONT_KEY, &page)?;
        store.update_option(SHOW_ON_FRONT_KEY, "page")?;
        info!(page = %page, "home page pinned");
        Ok(true)
    }
}
