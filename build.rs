use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

fn hash_dir(dir: &Path, hasher: &mut DefaultHasher) {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            hash_dir(&path, hasher);
        } else if path.is_file() {
            path.file_name().unwrap().to_str().unwrap().hash(hasher);
            fs::read(&path).unwrap().hash(hasher);
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed=static/");

    let mut hasher = DefaultHasher::new();
    hash_dir(Path::new("static"), &mut hasher);

    let hash = format!("{:x}", hasher.finish());
    println!("cargo:rustc-env=STATIC_HASH={}", &hash[..8]);
}
