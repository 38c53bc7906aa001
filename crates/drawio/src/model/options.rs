//! Diagram configuration.
//!
//! A document is configured with a list of [`DiagramOption`]s applied in
//! order at construction time. [`DiagramOptions`] sets everything at once
//! and converts into such a list.

use log::debug;

use crate::model::GraphModel;

/// One configuration setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramOption {
    GridSize(i32),
    ShowGrid(bool),
    /// Retained in [`Appearance`]; not written to the file.
    ShowBackground(bool),
    PageView(bool),
    Shadow(bool),
    ConnectionArrows(bool),
    ConnectionPoints(bool),
    Guides(bool),
    /// Retained in [`Appearance`]; not written to the file.
    GridColor(String),
    /// Retained in [`Appearance`]; not written to the file.
    BackgroundColor(String),
}

/// Settings accepted by the builder that have no attribute in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Appearance {
    pub show_background: bool,
    pub grid_color: Option<String>,
    pub background_color: Option<String>,
}

impl DiagramOption {
    /// Applies the setting to a model, or to `appearance` for settings the
    /// file cannot carry.
    pub fn apply(self, model: &mut GraphModel, appearance: &mut Appearance) {
        match self {
            DiagramOption::GridSize(size) => model.grid_size = size,
            DiagramOption::ShowGrid(on) => model.grid = Some(on),
            DiagramOption::PageView(on) => model.page = Some(on),
            DiagramOption::Shadow(on) => model.shadow = Some(on),
            DiagramOption::ConnectionArrows(on) => model.arrows = Some(on),
            DiagramOption::ConnectionPoints(on) => model.connect = Some(on),
            DiagramOption::Guides(on) => model.guides = Some(on),
            DiagramOption::ShowBackground(on) => {
                debug!(show_background = on; "Option has no file attribute; retained only");
                appearance.show_background = on;
            }
            DiagramOption::GridColor(color) => {
                debug!(grid_color = color.as_str(); "Option has no file attribute; retained only");
                appearance.grid_color = Some(color);
            }
            DiagramOption::BackgroundColor(color) => {
                debug!(background_color = color.as_str(); "Option has no file attribute; retained only");
                appearance.background_color = Some(color);
            }
        }
    }
}

/// Every setting at once.
///
/// `Default` matches a new document, so struct-update syntax changes only
/// the named settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramOptions {
    pub grid_size: i32,
    pub show_grid: bool,
    pub page_view: bool,
    pub show_background: bool,
    pub shadow: bool,
    pub grid_color: Option<String>,
    pub background_color: Option<String>,
    pub connection_arrows: bool,
    pub connection_points: bool,
    pub guides: bool,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            grid_size: GraphModel::DEFAULT_GRID_SIZE,
            show_grid: true,
            page_view: true,
            show_background: false,
            shadow: false,
            grid_color: None,
            background_color: None,
            connection_arrows: true,
            connection_points: true,
            guides: true,
        }
    }
}

impl From<DiagramOptions> for Vec<DiagramOption> {
    fn from(options: DiagramOptions) -> Self {
        let mut list = vec![
            DiagramOption::GridSize(options.grid_size),
            DiagramOption::ShowGrid(options.show_grid),
            DiagramOption::PageView(options.page_view),
            DiagramOption::ShowBackground(options.show_background),
            DiagramOption::Shadow(options.shadow),
            DiagramOption::ConnectionArrows(options.connection_arrows),
            DiagramOption::ConnectionPoints(options.connection_points),
            DiagramOption::Guides(options.guides),
        ];
        list.extend(options.grid_color.map(DiagramOption::GridColor));
        list.extend(options.background_color.map(DiagramOption::BackgroundColor));
        list
    }
}

impl IntoIterator for DiagramOptions {
    type Item = DiagramOption;
    type IntoIter = std::vec::IntoIter<DiagramOption>;

    fn into_iter(self) -> Self::IntoIter {
        Vec::from(self).into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(options: impl IntoIterator<Item = DiagramOption>) -> (GraphModel, Appearance) {
        let mut model = GraphModel::with_defaults();
        let mut appearance = Appearance::default();
        for option in options {
            option.apply(&mut model, &mut appearance);
        }
        (model, appearance)
    }

    #[test]
    fn test_model_options() {
        let (model, appearance) = configured([
            DiagramOption::GridSize(25),
            DiagramOption::ShowGrid(false),
            DiagramOption::Shadow(true),
            DiagramOption::ConnectionPoints(false),
            DiagramOption::ConnectionArrows(false),
            DiagramOption::PageView(false),
            DiagramOption::Guides(false),
        ]);
        assert_eq!(model.grid_size, 25);
        assert_eq!(model.grid, Some(false));
        assert_eq!(model.shadow, Some(true));
        assert_eq!(model.connect, Some(false));
        assert_eq!(model.arrows, Some(false));
        assert_eq!(model.page, Some(false));
        assert_eq!(model.guides, Some(false));
        assert_eq!(appearance, Appearance::default());
    }

    #[test]
    fn test_appearance_options_retained() {
        let (model, appearance) = configured([
            DiagramOption::GridColor("#d0d0d0".into()),
            DiagramOption::BackgroundColor("#ffffff".into()),
            DiagramOption::ShowBackground(true),
        ]);
        assert_eq!(model, GraphModel::with_defaults());
        assert_eq!(appearance.grid_color.as_deref(), Some("#d0d0d0"));
        assert_eq!(appearance.background_color.as_deref(), Some("#ffffff"));
        assert!(appearance.show_background);
    }

    #[test]
    fn test_later_options_win() {
        let (model, _) = configured([DiagramOption::GridSize(5), DiagramOption::GridSize(15)]);
        assert_eq!(model.grid_size, 15);
    }

    #[test]
    fn test_default_options_are_noop() {
        let (model, appearance) = configured(DiagramOptions::default());
        assert_eq!(model, GraphModel::with_defaults());
        assert_eq!(appearance, Appearance::default());
    }

    #[test]
    fn test_options_struct() {
        let options = DiagramOptions {
            shadow: true,
            grid_size: 25,
            grid_color: Some("#eee".into()),
            ..DiagramOptions::default()
        };
        let list: Vec<DiagramOption> = options.into();
        assert_eq!(list.len(), 9);
        assert!(list.contains(&DiagramOption::Shadow(true)));
        assert!(list.contains(&DiagramOption::GridColor("#eee".into())));
        assert!(list.contains(&DiagramOption::Guides(true)));
    }
}
