//! # Style Source and Resolved Snapshots
//!
//! The rasterizer cannot consult ambient style state: before anything is
//! painted, [`resolve`] produces a *style-inlined copy* of the preview
//! tree in which every block carries its concrete colors. `resolve` is a
//! pure function from (content tree, style source) to that copy, so the
//! flattening step the export pipeline depends on is testable in
//! isolation.

use super::{Block, CellText, Column, MetaCell, PartyBlock, PreviewTree, TotalsLine};

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
}

/// The preview's style source: one named color per visual role.
///
/// The defaults are the editor palette; exports always run on an opaque
/// white page regardless of what the screen shows behind the preview.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Page background (always opaque).
    pub page: Color,
    /// Primary text ink.
    pub ink: Color,
    /// Secondary text ink (addresses, labels).
    pub muted_ink: Color,
    /// Tertiary ink (placeholders, footer text).
    pub faint_ink: Color,
    /// Accent (table header fill, party headings).
    pub accent: Color,
    /// Deep accent (table header cell borders).
    pub accent_deep: Color,
    /// Soft accent fill (meta panel, grand-total band).
    pub accent_soft: Color,
    /// Border inside accent-filled panels.
    pub accent_border: Color,
    /// Neutral border.
    pub border: Color,
    /// Alternate row fill.
    pub stripe: Color,
    /// Discount ink.
    pub danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            page: Color::WHITE,
            ink: Color::rgb(0x1F, 0x29, 0x37),
            muted_ink: Color::rgb(0x4B, 0x55, 0x63),
            faint_ink: Color::rgb(0x6B, 0x72, 0x80),
            accent: Color::rgb(0x25, 0x63, 0xEB),
            accent_deep: Color::rgb(0x1D, 0x4E, 0xD8),
            accent_soft: Color::rgb(0xDB, 0xEA, 0xFE),
            accent_border: Color::rgb(0x93, 0xC5, 0xFD),
            border: Color::rgb(0xE5, 0xE7, 0xEB),
            stripe: Color::rgb(0xF9, 0xFA, 0xFB),
            danger: Color::rgb(0xDC, 0x26, 0x26),
        }
    }
}

/// A preview block with every visual property resolved to concrete
/// colors. This is all the rasterizer ever sees.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedBlock {
    Letterhead {
        /// Title drawn in place of the letterhead image when no asset is
        /// configured.
        title: String,
        title_ink: Color,
    },
    MetaPanel {
        rows: Vec<Vec<MetaCell>>,
        fill: Color,
        divider: Color,
        label_ink: Color,
        value_ink: Color,
    },
    PartyPanel {
        parties: Vec<PartyBlock>,
        border: Color,
        heading_ink: Color,
        primary_ink: Color,
        muted_ink: Color,
        placeholder_ink: Color,
    },
    ItemTable {
        columns: Vec<Column>,
        rows: Vec<Vec<CellText>>,
        header_fill: Color,
        header_ink: Color,
        header_border: Color,
        row_fill_even: Color,
        row_fill_odd: Color,
        cell_border: Color,
        ink: Color,
    },
    TotalsPanel {
        lines: Vec<TotalsLine>,
        row_fill: Color,
        row_border: Color,
        label_ink: Color,
        value_ink: Color,
        discount_ink: Color,
        grand_fill: Color,
        grand_ink: Color,
    },
    NotePanel {
        title: String,
        body: String,
        fill: Color,
        border: Color,
        title_ink: Color,
        body_ink: Color,
    },
    Footer {
        lines: Vec<String>,
        rule: Color,
        ink: Color,
    },
    SignatureRow {
        labels: Vec<String>,
        ink: Color,
        rule: Color,
    },
}

/// The style-inlined preview: page color plus resolved blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPreview {
    pub page: Color,
    pub blocks: Vec<ResolvedBlock>,
}

/// Resolve every block of `tree` against `theme`.
///
/// Pure: the output depends only on the arguments, and the input tree is
/// untouched — rasterization work never mutates the on-screen original.
pub fn resolve(tree: &PreviewTree, theme: &Theme) -> ResolvedPreview {
    let blocks = tree
        .blocks
        .iter()
        .map(|block| match block {
            Block::Letterhead { title } => ResolvedBlock::Letterhead {
                title: title.clone(),
                title_ink: theme.ink,
            },
            Block::MetaPanel { rows } => ResolvedBlock::MetaPanel {
                rows: rows.clone(),
                fill: theme.accent_soft,
                divider: theme.accent_border,
                label_ink: theme.ink,
                value_ink: theme.ink,
            },
            Block::PartyPanel { parties } => ResolvedBlock::PartyPanel {
                parties: parties.clone(),
                border: theme.border,
                heading_ink: theme.accent,
                primary_ink: theme.ink,
                muted_ink: theme.muted_ink,
                placeholder_ink: theme.faint_ink,
            },
            Block::ItemTable { columns, rows } => ResolvedBlock::ItemTable {
                columns: columns.clone(),
                rows: rows.clone(),
                header_fill: theme.accent,
                header_ink: Color::WHITE,
                header_border: theme.accent_deep,
                row_fill_even: theme.stripe,
                row_fill_odd: theme.page,
                cell_border: theme.border,
                ink: theme.ink,
            },
            Block::TotalsPanel { lines } => ResolvedBlock::TotalsPanel {
                lines: lines.clone(),
                row_fill: theme.page,
                row_border: theme.border,
                label_ink: theme.muted_ink,
                value_ink: theme.ink,
                discount_ink: theme.danger,
                grand_fill: theme.accent_soft,
                grand_ink: theme.ink,
            },
            Block::NotePanel { title, body } => ResolvedBlock::NotePanel {
                title: title.clone(),
                body: body.clone(),
                fill: theme.stripe,
                border: theme.border,
                title_ink: theme.ink,
                body_ink: theme.muted_ink,
            },
            Block::Footer { lines } => ResolvedBlock::Footer {
                lines: lines.clone(),
                rule: theme.border,
                ink: theme.faint_ink,
            },
            Block::SignatureRow { labels } => ResolvedBlock::SignatureRow {
                labels: labels.clone(),
                ink: theme.ink,
                rule: theme.border,
            },
        })
        .collect();

    ResolvedPreview {
        page: Color::WHITE,
        blocks,
    }
}
