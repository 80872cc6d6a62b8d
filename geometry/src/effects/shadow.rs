//! Shadow and outline duplication.
//!
//! Duplication grows the builder's channels in place. For `V` source
//! vertices and `K` copies the vertex streams end up as:
//!
//! ```text
//! [ copy 0 | copy 1 | ... | copy K-1 | source ]
//!   V        V              V          V
//! ```
//!
//! Copies come first so they draw beneath the source geometry. Index block
//! `j` addresses vertex segment `j`.

use glam::{Vec2, Vec3};

use crate::builder::MeshBuilder;
use crate::types::{Color32, Index};

/// Produces translated, recolored copies of a builder's geometry.
///
/// ```
/// use std::sync::Arc;
/// use glam::Vec2;
/// use redlilium_geometry::{Color32, Duplicator, GeometryCaches, MeshBuilder};
///
/// let mut builder = MeshBuilder::new(Arc::new(GeometryCaches::new()));
/// builder.set_up_quad(Vec2::ZERO, Vec2::splat(10.0), Vec2::ZERO, Vec2::ONE, Color32::WHITE);
///
/// let mut shadow = Duplicator::populate(&mut builder, 1);
/// shadow.translate(0, 2.0, -2.0);
///
/// assert_eq!(builder.vertex_count(), 8);
/// assert_eq!(builder.index_count(), 12);
/// ```
pub struct Duplicator<'a> {
    builder: &'a mut MeshBuilder,
    source_vertices: usize,
    copies: usize,
    color: Color32,
    inherit_alpha: bool,
}

impl<'a> Duplicator<'a> {
    /// Default copy color: black at half alpha.
    pub const DEFAULT_COLOR: Color32 = Color32::new(0, 0, 0, 128);

    /// Reserve room for `copies` copies of the builder's geometry.
    ///
    /// Copies hold the source UVs and rebased indices; their positions and
    /// colors are written by [`translate`](Self::translate). An unprepared or
    /// empty builder, or zero copies, leaves the builder as is.
    pub fn populate(builder: &'a mut MeshBuilder, copies: usize) -> Self {
        let source_vertices = if builder.is_prepared() {
            builder.vertex_count()
        } else {
            0
        };
        if source_vertices > 0 && copies > 0 {
            duplicate(builder, source_vertices, copies);
        }
        Self {
            builder,
            source_vertices,
            copies,
            color: Self::DEFAULT_COLOR,
            inherit_alpha: true,
        }
    }

    /// Set the copy color, and whether each copy vertex scales its alpha by
    /// the source vertex alpha.
    pub fn with_color(mut self, color: Color32, inherit_alpha: bool) -> Self {
        self.color = color;
        self.inherit_alpha = inherit_alpha;
        self
    }

    /// Write copy `copy` as the source geometry offset by `(dx, dy)`.
    pub fn translate(&mut self, copy: usize, dx: f32, dy: f32) {
        debug_assert!(
            copy < self.copies,
            "copy {copy} out of range for {} copies",
            self.copies
        );
        let v = self.source_vertices;
        if v == 0 {
            return;
        }
        let source = v * self.copies;
        let slot = v * copy..v * (copy + 1);

        let offset = Vec3::new(dx, dy, 0.0);
        let (copies, src) = self.builder.positions.edit().split_at_mut(source);
        for (dst, src) in copies[slot.clone()].iter_mut().zip(src.iter()) {
            *dst = *src + offset;
        }

        let (color, inherit_alpha) = (self.color, self.inherit_alpha);
        let (copies, src) = self.builder.colors.edit().split_at_mut(source);
        for (dst, src) in copies[slot].iter_mut().zip(src.iter()) {
            *dst = if inherit_alpha {
                color.attenuate_alpha(src.a)
            } else {
                color
            };
        }
    }

    /// Number of copies.
    pub fn copies(&self) -> usize {
        self.copies
    }

    /// Vertices in the source geometry.
    pub fn source_vertices(&self) -> usize {
        self.source_vertices
    }
}

/// Grow every channel to `copies + 1` segments, moving the source vertices
/// to the last segment and rebasing index blocks.
fn duplicate(builder: &mut MeshBuilder, v: usize, copies: usize) {
    crate::profile_function!();
    let total = v * (copies + 1);
    debug_assert!(
        total <= Index::MAX as usize + 1,
        "{copies} copies of {v} vertices exceed the 16-bit index limit"
    );

    builder.positions.resize(total).copy_within(0..v, v * copies);
    builder.colors.resize(total).copy_within(0..v, v * copies);

    let uvs = builder.uvs.resize(total);
    for segment in 1..=copies {
        uvs.copy_within(0..v, v * segment);
    }

    let index_count = builder.index_count();
    if index_count == 0 {
        return;
    }
    let indices = builder.indices.resize(index_count * (copies + 1));
    let (source, rest) = indices.split_at_mut(index_count);
    for (segment, block) in rest.chunks_exact_mut(index_count).enumerate() {
        let offset = (v * (segment + 1)) as Index;
        for (dst, src) in block.iter_mut().zip(source.iter()) {
            *dst = *src + offset;
        }
    }
}

/// Fixed offset tables for duplication effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadowStyle {
    /// One copy at `(dx, dy)`.
    #[default]
    Shadow,
    /// Four copies at the diagonals.
    Outline4,
    /// Four diagonal copies followed by four axis-aligned ones.
    Outline8,
}

impl ShadowStyle {
    const SHADOW: &'static [(f32, f32)] = &[(1.0, 1.0)];
    const OUTLINE8: &'static [(f32, f32)] = &[
        (1.0, 1.0),
        (1.0, -1.0),
        (-1.0, 1.0),
        (-1.0, -1.0),
        (1.0, 0.0),
        (-1.0, 0.0),
        (0.0, 1.0),
        (0.0, -1.0),
    ];

    fn signs(self) -> &'static [(f32, f32)] {
        match self {
            Self::Shadow => Self::SHADOW,
            Self::Outline4 => &Self::OUTLINE8[..4],
            Self::Outline8 => Self::OUTLINE8,
        }
    }

    /// Number of copies this style produces.
    pub fn copy_count(self) -> usize {
        self.signs().len()
    }

    /// Offsets of each copy for an effect distance of `distance`.
    pub fn offsets(self, distance: Vec2) -> impl Iterator<Item = Vec2> {
        self.signs()
            .iter()
            .map(move |&(sx, sy)| Vec2::new(sx * distance.x, sy * distance.y))
    }
}

/// A configured drop shadow or outline.
///
/// ```
/// use std::sync::Arc;
/// use glam::Vec2;
/// use redlilium_geometry::{Color32, GeometryCaches, MeshBuilder, ShadowEffect, ShadowStyle};
///
/// let mut builder = MeshBuilder::new(Arc::new(GeometryCaches::new()));
/// builder.set_up_quad(Vec2::ZERO, Vec2::splat(10.0), Vec2::ZERO, Vec2::ONE, Color32::WHITE);
///
/// let outline = ShadowEffect {
///     style: ShadowStyle::Outline8,
///     distance: Vec2::splat(1.0),
///     ..ShadowEffect::default()
/// };
/// outline.apply(&mut builder);
/// assert_eq!(builder.vertex_count(), 4 * 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowEffect {
    /// Offset table.
    pub style: ShadowStyle,
    /// Per-axis offset magnitude.
    pub distance: Vec2,
    /// Color of every copy.
    pub color: Color32,
    /// Scale copy alpha by source vertex alpha.
    pub inherit_alpha: bool,
}

impl Default for ShadowEffect {
    fn default() -> Self {
        Self {
            style: ShadowStyle::Shadow,
            distance: Vec2::new(1.0, -1.0),
            color: Duplicator::DEFAULT_COLOR,
            inherit_alpha: true,
        }
    }
}

impl ShadowEffect {
    /// Duplicate and offset the builder's geometry.
    pub fn apply(&self, builder: &mut MeshBuilder) {
        crate::profile_scope!("shadow_effect");
        let copies = self.style.copy_count();
        let mut duplicator =
            Duplicator::populate(builder, copies).with_color(self.color, self.inherit_alpha);
        for (i, offset) in self.style.offsets(self.distance).enumerate() {
            duplicator.translate(i, offset.x, offset.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rstest::rstest;

    use crate::tables::GeometryCaches;

    fn quad_builder(color: Color32) -> MeshBuilder {
        let mut builder = MeshBuilder::new(Arc::new(GeometryCaches::new()));
        builder.set_up_quad(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            color,
        );
        builder
    }

    #[test]
    fn test_single_shadow_layout() {
        let mut builder = quad_builder(Color32::WHITE);
        let original: Vec<Vec3> = builder.positions.as_slice().to_vec();
        let original_uvs: Vec<Vec2> = builder.uvs.as_slice().to_vec();

        let mut shadow = Duplicator::populate(&mut builder, 1)
            .with_color(Color32::new(0, 0, 0, 128), true);
        shadow.translate(0, 2.0, -2.0);

        assert_eq!(builder.vertex_count(), 8);
        assert_eq!(builder.index_count(), 12);

        let positions = builder.positions.as_slice();
        let colors = builder.colors.as_slice();
        for i in 0..4 {
            assert_eq!(positions[i], original[i] + Vec3::new(2.0, -2.0, 0.0));
            assert_eq!(colors[i], Color32::new(0, 0, 0, 128));
            assert_eq!(positions[4 + i], original[i]);
            assert_eq!(colors[4 + i], Color32::WHITE);
        }

        assert_eq!(&builder.uvs.as_slice()[..4], original_uvs.as_slice());
        assert_eq!(&builder.uvs.as_slice()[4..], original_uvs.as_slice());

        assert_eq!(
            builder.indices.as_slice(),
            &[0, 2, 3, 3, 1, 0, 4, 6, 7, 7, 5, 4]
        );
        assert!(builder.validate().is_ok());
    }

    #[test]
    fn test_shared_tables_untouched_by_duplication() {
        let mut builder = quad_builder(Color32::WHITE);
        let caches = builder.caches().clone();
        let mut shadow = Duplicator::populate(&mut builder, 1);
        shadow.translate(0, 1.0, 1.0);

        assert!(builder.colors.is_owned());
        assert!(builder.indices.is_owned());
        assert_eq!(caches.quad_indices(1).as_slice(), &[0, 2, 3, 3, 1, 0]);
        assert!(
            caches
                .solid_colors(Color32::WHITE, 4)
                .unwrap()
                .iter()
                .all(|&c| c == Color32::WHITE)
        );
    }

    #[rstest]
    #[case::inherit(true, 64)]
    #[case::fixed(false, 128)]
    fn test_alpha_inheritance(#[case] inherit: bool, #[case] expected_alpha: u8) {
        let mut builder = quad_builder(Color32::new(255, 0, 0, 128));
        let mut shadow = Duplicator::populate(&mut builder, 1)
            .with_color(Color32::new(0, 0, 0, 128), inherit);
        shadow.translate(0, 1.0, 1.0);

        assert!(
            builder.colors.as_slice()[..4]
                .iter()
                .all(|c| c.a == expected_alpha)
        );
    }

    #[test]
    fn test_unprepared_builder_is_untouched() {
        let mut builder = MeshBuilder::new(Arc::new(GeometryCaches::new()));
        let mut shadow = Duplicator::populate(&mut builder, 2);
        assert_eq!(shadow.source_vertices(), 0);
        shadow.translate(1, 1.0, 1.0);
        assert!(builder.is_invalidated());
    }

    #[test]
    fn test_zero_copies_is_noop() {
        let mut builder = quad_builder(Color32::WHITE);
        let shadow = Duplicator::populate(&mut builder, 0);
        assert_eq!(shadow.copies(), 0);
        assert_eq!(builder.vertex_count(), 4);
        assert_eq!(builder.index_count(), 6);
    }

    #[test]
    fn test_empty_builder_is_untouched() {
        let mut builder = MeshBuilder::new(Arc::new(GeometryCaches::new()));
        builder.set_up_empty();
        ShadowEffect::default().apply(&mut builder);
        assert_eq!(builder.vertex_count(), 0);
        assert!(builder.validate().is_ok());
    }

    #[rstest]
    #[case::shadow(ShadowStyle::Shadow, 1)]
    #[case::outline4(ShadowStyle::Outline4, 4)]
    #[case::outline8(ShadowStyle::Outline8, 8)]
    fn test_style_copy_counts(#[case] style: ShadowStyle, #[case] copies: usize) {
        assert_eq!(style.copy_count(), copies);

        let mut builder = quad_builder(Color32::WHITE);
        ShadowEffect {
            style,
            distance: Vec2::new(1.0, 1.0),
            ..ShadowEffect::default()
        }
        .apply(&mut builder);

        assert_eq!(builder.vertex_count(), 4 * (copies + 1));
        assert_eq!(builder.index_count(), 6 * (copies + 1));
        assert!(builder.validate().is_ok());
    }

    #[test]
    fn test_outline8_offsets() {
        let offsets: Vec<Vec2> = ShadowStyle::Outline8.offsets(Vec2::new(2.0, 3.0)).collect();
        assert_eq!(
            offsets,
            vec![
                Vec2::new(2.0, 3.0),
                Vec2::new(2.0, -3.0),
                Vec2::new(-2.0, 3.0),
                Vec2::new(-2.0, -3.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(-2.0, 0.0),
                Vec2::new(0.0, 3.0),
                Vec2::new(0.0, -3.0),
            ]
        );
    }

    #[test]
    fn test_outline4_bounds() {
        let mut builder = quad_builder(Color32::WHITE);
        ShadowEffect {
            style: ShadowStyle::Outline4,
            distance: Vec2::new(1.0, 1.0),
            ..ShadowEffect::default()
        }
        .apply(&mut builder);

        let bounds = builder.bounds().unwrap();
        assert_eq!(bounds.min, Vec2::new(-1.0, -1.0));
        assert_eq!(bounds.max, Vec2::new(11.0, 11.0));
        // Source geometry stays last.
        assert_eq!(builder.colors.as_slice()[16..], [Color32::WHITE; 4]);
    }

    #[test]
    fn test_multi_quad_source() {
        let mut builder = MeshBuilder::new(Arc::new(GeometryCaches::new()));
        let mut batch = builder.quad_batch(2);
        batch.add(Vec2::ZERO, Vec2::ONE, Vec2::ZERO, Vec2::ONE);
        batch.add(Vec2::new(2.0, 0.0), Vec2::new(3.0, 1.0), Vec2::ZERO, Vec2::ONE);
        batch.commit(Color32::WHITE);

        ShadowEffect::default().apply(&mut builder);

        assert_eq!(builder.vertex_count(), 16);
        assert_eq!(&builder.indices.as_slice()[12..18], &[8, 10, 11, 11, 9, 8]);
        assert_eq!(
            builder.positions.as_slice()[0],
            Vec3::new(1.0, -1.0, 0.0)
        );
        assert!(builder.validate().is_ok());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn test_translate_past_copies_panics() {
        let mut builder = quad_builder(Color32::WHITE);
        let mut shadow = Duplicator::populate(&mut builder, 1);
        shadow.translate(1, 1.0, 1.0);
    }
}
