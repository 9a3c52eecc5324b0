//! 结果页面模块
//!
//! # 设计思路
//!
//! 页面是内存中的文档：一个 id 为 `content` 的元素，子元素是每次粘贴生成的结果容器，
//! 新结果总是插到最前面。每个容器结构固定为
//! `div.img-container > div.shadow-container > img(原图) + img(灰度图)`。
//!
//! # 实现思路
//!
//! - `to_html` 生成完整 HTML 文档，图片以 Data URL 内联，不依赖网络或磁盘上的其他文件。
//! - `write_to` 先写临时文件再重命名，浏览器刷新时不会读到写了一半的页面。

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::AppError;
use crate::image_handler::{GrayscaleStrategy, RenderedPaste};

/// 页面上 `content` 元素的 id。
pub const CONTENT_ELEMENT_ID: &str = "content";

const PAGE_STYLE: &str = "\
body { font-family: sans-serif; margin: 2rem; background: #f4f4f4; }
#content { display: flex; flex-direction: column; gap: 1.5rem; }
.img-container { display: flex; flex-direction: column; gap: 0.25rem; }
.shadow-container { display: flex; gap: 1rem; }
.shadow-container img { max-width: 48%; box-shadow: 0 2px 8px rgba(0, 0, 0, 0.25); }
.meta { color: #666; font-size: 0.8rem; }";

/// 一次粘贴对应的结果容器。
#[derive(Debug, Clone)]
pub struct ResultContainer {
    pub width: u32,
    pub height: u32,
    pub original_src: String,
    pub grayscale_src: String,
    pub strategy: GrayscaleStrategy,
    pub created_at: DateTime<Local>,
}

impl From<RenderedPaste> for ResultContainer {
    fn from(rendered: RenderedPaste) -> Self {
        Self {
            width: rendered.width,
            height: rendered.height,
            original_src: rendered.original_data_url,
            grayscale_src: rendered.grayscale_data_url,
            strategy: rendered.strategy,
            created_at: rendered.created_at,
        }
    }
}

impl ResultContainer {
    fn write_html(&self, out: &mut String) {
        let _ = write!(
            out,
            "<div class=\"img-container\">\
<div class=\"shadow-container\">\
<img src=\"{}\" alt=\"original\" width=\"{}\" height=\"{}\">\
<img src=\"{}\" alt=\"grayscale ({})\" width=\"{}\" height=\"{}\">\
</div>\
<span class=\"meta\">{}x{} · {} · {}</span>\
</div>\n",
            escape_html(&self.original_src),
            self.width,
            self.height,
            escape_html(&self.grayscale_src),
            self.strategy.as_str(),
            self.width,
            self.height,
            self.width,
            self.height,
            self.strategy.as_str(),
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }
}

/// 内存中的结果页面。
#[derive(Debug, Clone)]
pub struct Page {
    title: String,
    content: VecDeque<ResultContainer>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: VecDeque::new(),
        }
    }

    /// 把结果容器插到 `content` 的最前面。
    pub fn prepend(&mut self, container: ResultContainer) {
        self.content.push_front(container);
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// 按显示顺序（新 → 旧）遍历结果容器。
    pub fn containers(&self) -> impl Iterator<Item = &ResultContainer> {
        self.content.iter()
    }

    /// 生成完整 HTML 文档。
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(
            1024 + self
                .content
                .iter()
                .map(|c| c.original_src.len() + c.grayscale_src.len() + 256)
                .sum::<usize>(),
        );

        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n<main id=\"{}\">\n",
            escape_html(&self.title),
            PAGE_STYLE,
            CONTENT_ELEMENT_ID,
        );

        for container in &self.content {
            container.write_html(&mut out);
        }

        out.push_str("</main>\n</body>\n</html>\n");
        out
    }

    /// 将页面快照写到 `path`，父目录不存在时自动创建。
    pub fn write_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::Storage(format!("创建输出目录 '{}' 失败: {}", parent.display(), e))
                })?;
            }
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| AppError::Storage(format!("输出路径缺少文件名: {}", path.display())))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        fs::write(&tmp_path, self.to_html())?;
        fs::rename(&tmp_path, path)?;

        log::debug!("📝 页面已写入 {}（{} 个结果）", path.display(), self.len());
        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(tag: &str) -> ResultContainer {
        ResultContainer {
            width: 2,
            height: 2,
            original_src: format!("data:image/png;base64,{}O", tag),
            grayscale_src: format!("data:image/png;base64,{}G", tag),
            strategy: GrayscaleStrategy::StandardLuma,
            created_at: Local::now(),
        }
    }

    #[test]
    fn prepend_puts_newest_first() {
        let mut page = Page::new("test");
        page.prepend(container("first"));
        page.prepend(container("second"));

        let order: Vec<&str> = page.containers().map(|c| c.original_src.as_str()).collect();
        assert_eq!(
            order,
            vec!["data:image/png;base64,secondO", "data:image/png;base64,firstO"]
        );
    }

    #[test]
    fn html_nests_two_images_per_container() {
        let mut page = Page::new("test");
        page.prepend(container("a"));
        let html = page.to_html();

        assert!(html.contains("<main id=\"content\">"));
        assert_eq!(html.matches("class=\"img-container\"").count(), 1);
        assert_eq!(html.matches("class=\"shadow-container\"").count(), 1);
        assert_eq!(html.matches("<img ").count(), 2);

        let original = html.find("base64,aO").expect("original image missing");
        let grayscale = html.find("base64,aG").expect("grayscale image missing");
        assert!(original < grayscale);
    }

    #[test]
    fn empty_page_still_has_content_element() {
        let page = Page::new("<title & more>");
        let html = page.to_html();

        assert!(page.is_empty());
        assert!(html.contains("id=\"content\""));
        assert!(html.contains("&lt;title &amp; more&gt;"));
        assert!(!html.contains("<img "));
    }

    #[test]
    fn write_to_creates_parent_dir() {
        let dir = std::env::temp_dir().join(format!("paste-luma-page-{}", std::process::id()));
        let path = dir.join("nested").join("page.html");
        let mut page = Page::new("test");
        page.prepend(container("w"));

        page.write_to(&path).expect("write failed");

        let written = fs::read_to_string(&path).expect("read back failed");
        assert_eq!(written, page.to_html());
        assert!(!dir.join("nested").join("page.html.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
