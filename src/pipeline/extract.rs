//! Embedded-image extraction: walk every page's image objects via pdfium
//! and write each raster image out as a PNG file.
//!
//! ## Naming scheme
//!
//! Files are named `page<N>_img<M>.png` with 1-based page and within-page
//! indices. The scheme is deterministic: the emitter and the reconciler both
//! rely on it, and re-running extraction over the same PDF reproduces the
//! same file set.
//!
//! ## Colour handling
//!
//! Greyscale and RGB images (with or without alpha — fewer than 5 channels)
//! are saved as-is. Anything wider (CMYK and other ≥5-channel models) is
//! converted to RGB before saving, since PNG cannot represent it directly.
//!
//! ## Failure model
//!
//! A decode or save failure skips that one image: it is recorded in the
//! returned skip list and logged at WARN, and extraction continues with the
//! rest of the page. Only document-level problems (missing file, corrupt
//! PDF, wrong password) abort the run. The pdfium document handle is scoped
//! to this call and dropped on every exit path, so the source file is never
//! left locked.

use crate::config::{bind_pdfium, ConversionConfig};
use crate::error::{ImageError, PdfMdError};
use crate::output::ImagePathMap;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Extract every embedded raster image of `pdf_path` into `image_dir`.
///
/// Creates `image_dir` if absent. Returns the page → image-paths mapping in
/// extraction order plus the list of skipped images.
pub fn extract_images(
    pdf_path: &Path,
    image_dir: &Path,
    config: &ConversionConfig,
) -> Result<(ImagePathMap, Vec<ImageError>), PdfMdError> {
    validate_pdf_path(pdf_path)?;

    std::fs::create_dir_all(image_dir).map_err(|e| PdfMdError::OutputWriteFailed {
        path: image_dir.to_path_buf(),
        source: e,
    })?;

    let pdfium = bind_pdfium(config)?;
    let document = load_document(&pdfium, pdf_path, config.password.as_deref())?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let mut image_map = ImagePathMap::new();
    let mut skipped = Vec::new();

    for (page_index, page) in pages.iter().enumerate() {
        let page_num = page_index + 1;
        let paths = image_map.entry(page_num).or_default();

        let mut img_index = 0usize;
        for object in page.objects().iter() {
            let Some(image_object) = object.as_image_object() else {
                continue;
            };
            img_index += 1;

            let img_path = image_dir.join(format!("page{page_num}_img{img_index}.png"));

            let decoded = match image_object.get_raw_image() {
                Ok(img) => img,
                Err(e) => {
                    let skip = ImageError::DecodeFailed {
                        page: page_num,
                        index: img_index,
                        detail: format!("{e:?}"),
                    };
                    warn!("{skip}");
                    skipped.push(skip);
                    continue;
                }
            };

            match save_as_png(&decoded, &img_path) {
                Ok(()) => {
                    debug!(
                        "Extracted page {} image {} -> {}",
                        page_num,
                        img_index,
                        img_path.display()
                    );
                    paths.push(img_path);
                }
                Err(e) => {
                    let skip = ImageError::SaveFailed {
                        page: page_num,
                        index: img_index,
                        path: img_path,
                        detail: e.to_string(),
                    };
                    warn!("{skip}");
                    skipped.push(skip);
                }
            }
        }
    }

    let extracted: usize = image_map.values().map(Vec::len).sum();
    info!(
        "Extracted {} images across {} pages ({} skipped)",
        extracted,
        total_pages,
        skipped.len()
    );

    Ok((image_map, skipped))
}

/// Total page count of the PDF, without extracting anything.
pub fn page_count(pdf_path: &Path, config: &ConversionConfig) -> Result<usize, PdfMdError> {
    validate_pdf_path(pdf_path)?;
    let pdfium = bind_pdfium(config)?;
    let document = load_document(&pdfium, pdf_path, config.password.as_deref())?;
    Ok(document.pages().len() as usize)
}

/// Validate existence, readability, and PDF magic bytes before pdfium sees
/// the file, so callers get a meaningful error rather than a pdfium crash.
fn validate_pdf_path(path: &Path) -> Result<(), PdfMdError> {
    if !path.exists() {
        return Err(PdfMdError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(PdfMdError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(PdfMdError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(PdfMdError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// Open the PDF, classifying password failures separately from corruption.
fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, PdfMdError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{e:?}");
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                PdfMdError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                PdfMdError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            PdfMdError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Save `img` as PNG, converting to RGB first when the colour model has 5 or
/// more channels.
///
/// pdfium converts CMYK bitmaps to RGB before handing them over, and
/// `DynamicImage` currently tops out at four channels, so the conversion arm
/// only fires if a wider colour model ever reaches this point.
fn save_as_png(img: &DynamicImage, path: &Path) -> Result<(), image::ImageError> {
    if img.color().channel_count() < 5 {
        img.save_with_format(path, image::ImageFormat::Png)
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8()).save_with_format(path, image::ImageFormat::Png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn validate_rejects_missing_file() {
        let err = validate_pdf_path(Path::new("/no/such/file.pdf")).unwrap_err();
        assert!(matches!(err, PdfMdError::FileNotFound { .. }));
    }

    #[test]
    fn validate_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        let err = validate_pdf_path(&path).unwrap_err();
        assert!(matches!(err, PdfMdError::NotAPdf { .. }));
    }

    #[test]
    fn validate_accepts_pdf_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.pdf");
        std::fs::write(&path, b"%PDF-1.7 rest of file").unwrap();
        assert!(validate_pdf_path(&path).is_ok());
    }

    #[test]
    fn save_rgba_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page1_img1.png");
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255])));
        save_as_png(&img, &path).unwrap();
        let back = image::open(&path).unwrap();
        assert_eq!(back.width(), 4);
        // RGBA has 4 channels, so no conversion happened
        assert_eq!(back.color().channel_count(), 4);
    }
}
