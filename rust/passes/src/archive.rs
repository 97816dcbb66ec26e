// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Archival `.ifczip` output.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

/// Copy `src` into a gzip container at `dst`
pub fn write_ifczip(src: &Path, dst: &Path) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(src)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(dst)?), Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_gzip_container() {
        let dir = std::env::temp_dir();
        let src = dir.join(format!("ifcslim-archive-src-{}.ifc", std::process::id()));
        let dst = dir.join(format!("ifcslim-archive-dst-{}.ifczip", std::process::id()));
        std::fs::write(&src, b"ISO-10303-21;\nDATA;\nENDSEC;\n").unwrap();

        write_ifczip(&src, &dst).unwrap();

        let mut magic = [0u8; 2];
        File::open(&dst).unwrap().read_exact(&mut magic).unwrap();
        assert_eq!(magic, [0x1f, 0x8b]);

        let mut decoder = flate2::read::GzDecoder::new(File::open(&dst).unwrap());
        let mut round_tripped = String::new();
        decoder.read_to_string(&mut round_tripped).unwrap();
        assert_eq!(round_tripped, "ISO-10303-21;\nDATA;\nENDSEC;\n");

        std::fs::remove_file(&src).ok();
        std::fs::remove_file(&dst).ok();
    }
}
