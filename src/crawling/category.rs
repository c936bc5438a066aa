use crate::utils::error::Result;
use std::collections::BTreeMap;

pub const MAPPING_FILE: &str = "category_mapping.json";

/// Folds a Vietnamese character to its ASCII base letter.
fn fold_vietnamese(c: char) -> char {
    match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ' | 'ẩ'
        | 'ẫ' | 'ậ' => 'a',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ' | 'ở'
        | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

/// Directory-safe slug of a category title: `"Thời sự"` becomes `"thoi-su"`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase).map(fold_vietnamese) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "uncategorized".to_string()
    } else {
        slug
    }
}

/// Remembers the display title of every slug handed out during a crawl.
#[derive(Debug, Clone, Default)]
pub struct CategoryMapper {
    mappings: BTreeMap<String, String>,
}

impl CategoryMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a mapping previously written with [`CategoryMapper::to_json`].
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let mappings = serde_json::from_slice(data)?;
        Ok(Self { mappings })
    }

    pub fn normalized_name(&mut self, title: &str) -> String {
        let slug = slugify(title);
        self.mappings
            .entry(slug.clone())
            .or_insert_with(|| title.trim().to_string());
        slug
    }

    pub fn display_name(&self, slug: &str) -> Option<&str> {
        self.mappings.get(slug).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.mappings)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_folds_vietnamese() {
        assert_eq!(slugify("Thời sự"), "thoi-su");
        assert_eq!(slugify("Kinh tế - Tài chính"), "kinh-te-tai-chinh");
        assert_eq!(slugify("ĐỐI NGOẠI"), "doi-ngoai");
        assert_eq!(slugify("  Văn hóa / Xã hội  "), "van-hoa-xa-hoi");
        assert_eq!(slugify("Chỉ đạo 2025"), "chi-dao-2025");
        assert_eq!(slugify("!!!"), "uncategorized");
    }

    #[test]
    fn test_mapper_keeps_first_display_name() {
        let mut mapper = CategoryMapper::new();

        assert_eq!(mapper.normalized_name("Thời sự"), "thoi-su");
        assert_eq!(mapper.normalized_name("THỜI SỰ"), "thoi-su");

        assert_eq!(mapper.len(), 1);
        assert_eq!(mapper.display_name("thoi-su"), Some("Thời sự"));
        assert_eq!(mapper.display_name("kinh-te"), None);
    }

    #[test]
    fn test_mapping_json_preserves_unicode() {
        let mut mapper = CategoryMapper::new();
        mapper.normalized_name("Đối ngoại");

        let json = mapper.to_json().unwrap();
        let text = String::from_utf8(json.clone()).unwrap();
        assert!(text.contains("\"doi-ngoai\": \"Đối ngoại\""));

        let restored = CategoryMapper::from_json(&json).unwrap();
        assert_eq!(restored.display_name("doi-ngoai"), Some("Đối ngoại"));
    }
}
