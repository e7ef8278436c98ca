use std::path::{Path, PathBuf};

use esgsense_core::DataPaths;

/// Filtered feed with one bad date and one empty tone.
pub const SAMPLE_FEED: &str = "\
SQLDATE,V2Themes,Organizations,V2Tone,SourceCollectionIdentifier,DocumentIdentifier
20240701,LEGISLATION;ECON_STOCKMARKET,tesla inc,\"-1.5,2.1,3.6,5.7,20.1,0\",a.com,https://a.com/1
20240701,MEDICAL,tesla inc,\"2.5,4.0,1.5,5.5,18.0,0\",b.com,https://b.com/1
20240702,ECON_STOCKMARKET,tesla,\"0.5,2.0,1.5,3.5,19.2,0\",a.com,https://a.com/2
20241301,LEGISLATION,tesla,\"1.0,2.0,1.0,3.0,10.0,0\",a.com,https://a.com/3
20240703,ELECTION,tesla,,b.com,https://b.com/2
20240705,WB_678_DIGITAL_GOVERNMENT,tesla,\"-3.2,1.0,4.2,5.2,22.4,0\",c.com,https://c.com/1
20240805,NATURAL_DISASTER,tesla motors,\"1.0,2.5,1.5,4.0,21.0,0\",a.com,https://a.com/4
";

pub fn write_feed(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("tesla_esg.csv");
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn data_paths(dir: &Path) -> DataPaths {
    DataPaths::new(dir.join("data")).unwrap()
}
