use std::path::PathBuf;

use image::DynamicImage;

use crate::io::{self, IMAGE_EXTENSIONS, SourceImage};

#[derive(Debug, Clone)]
pub struct SavedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

pub async fn pick_image() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Open File")
        .add_filter("Images", &IMAGE_EXTENSIONS)
        .pick_file()
        .await
        .map(|file| file.path().to_path_buf())
}

pub async fn pick_save_target(suggested: String) -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Save File")
        .add_filter("Images", &IMAGE_EXTENSIONS)
        .set_file_name(suggested)
        .save_file()
        .await
        .map(|file| {
            let path = file.path().to_path_buf();
            if path.extension().is_none() {
                path.with_extension("png")
            } else {
                path
            }
        })
}

pub async fn load_image_task(path: PathBuf) -> Result<SourceImage, String> {
    tokio::task::spawn_blocking(move || io::read_image(&path).map_err(|err| err.to_string()))
        .await
        .map_err(|err| err.to_string())?
}

pub async fn save_image_task(path: PathBuf, image: DynamicImage) -> Result<SavedFile, String> {
    tokio::task::spawn_blocking(move || {
        let bytes = io::write_image(&path, &image).map_err(|err| err.to_string())?;
        Ok(SavedFile { path, bytes })
    })
    .await
    .map_err(|err| err.to_string())?
}
