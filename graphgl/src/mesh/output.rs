//! Geometry output implementation
use super::Geometry;
use std::io::{BufWriter, Write};

impl Geometry {
    /// Writes the triangles of this geometry as a binary STL
    ///
    /// Positions are written as-is, in the y-up frame.  Curves and unmeshed
    /// surfaces have no triangles, so they produce a valid but empty file.
    pub fn write_stl<F: std::io::Write>(
        &self,
        out: &mut F,
    ) -> Result<(), crate::Error> {
        let mut out = BufWriter::new(out);
        const HEADER: &[u8] = b"This is a binary STL file exported by graphgl";
        static_assertions::const_assert!(HEADER.len() <= 80);
        out.write_all(HEADER)?;
        out.write_all(&[0u8; 80 - HEADER.len()])?;
        out.write_all(&(self.triangle_count() as u32).to_le_bytes())?;
        for t in self.indices.chunks_exact(3) {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| {
                let n = self.vertices.len();
                self.vertices
                    .get(i as usize)
                    .map(|v| v.position)
                    .ok_or(crate::Error::BadIndex(i as usize, n))
            });
            let (a, b, c) = (a?, b?, c?);
            let normal = (b - a).cross(&(c - a));
            for p in normal.iter() {
                out.write_all(&p.to_le_bytes())?;
            }
            for v in [a, b, c] {
                for p in v.iter() {
                    out.write_all(&p.to_le_bytes())?;
                }
            }
            out.write_all(&[0u8; std::mem::size_of::<u16>()])?; // attributes
        }
        out.flush()?;
        Ok(())
    }
}
