use rust_htslib::bam;
use rust_htslib::bam::Read as BamRead;

use errors::Result;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadGroup {
    pub id: String,
    pub sample: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BamSummary {
    pub read_groups: Vec<ReadGroup>,
    pub num_primary_alignments: u64,
    pub num_mapped_primary_alignments: u64,
}

/// Collect the @RG lines of a SAM header. Lines without an ID are skipped.
pub fn parse_read_groups(header_text: &str) -> Vec<ReadGroup> {
    let mut read_groups = vec![];
    for line in header_text.lines() {
        let mut fields = line.split('\t');
        if fields.next() != Some("@RG") {
            continue;
        }
        let mut rg = ReadGroup::default();
        let mut found_id = false;
        for field in fields {
            if let Some(v) = field.strip_prefix("ID:") {
                rg.id = v.to_string();
                found_id = true;
            } else if let Some(v) = field.strip_prefix("SM:") {
                rg.sample = Some(v.to_string());
            } else if let Some(v) = field.strip_prefix("PL:") {
                rg.platform = Some(v.to_string());
            }
        }
        if found_id {
            read_groups.push(rg);
        } else {
            warn!("Ignoring @RG header line without ID: {}", line);
        }
    }
    read_groups
}

/// Read through a BAM file, counting primary alignments, i.e. those which
/// are neither secondary nor supplementary.
pub fn summarise_bam(path: &str, threads: u16) -> Result<BamSummary> {
    let mut reader = bam::Reader::from_path(path)?;
    if threads > 1 {
        reader.set_threads(threads as usize - 1)?;
    }
    let header_text = String::from_utf8_lossy(reader.header().as_bytes()).to_string();
    let mut summary = BamSummary {
        read_groups: parse_read_groups(&header_text),
        ..Default::default()
    };

    let mut record = bam::Record::new();
    while let Some(r) = reader.read(&mut record) {
        r?;
        if record.is_secondary() || record.is_supplementary() {
            continue;
        }
        summary.num_primary_alignments += 1;
        if !record.is_unmapped() {
            summary.num_mapped_primary_alignments += 1;
        }
    }
    debug!("Summary of {}: {:?}", path, summary);
    Ok(summary)
}
