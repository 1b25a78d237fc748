use log::warn;

/// 起動時に表示するエントリ画面
///
/// UIテストで各画面を単独起動するための切り替え。通常起動はカメラ画面。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryScreen {
    /// カメラ（撮影）画面
    #[default]
    Camera,
    /// ギャラリー画面
    Gallery,
    /// 詳細（編集）画面
    Details,
}

impl EntryScreen {
    /// 画面名からエントリ画面を解決する
    ///
    /// # 引数
    /// * `name` - 画面名（camera / gallery / details）
    ///
    /// # 戻り値
    /// 対応するエントリ画面、未知の名前の場合はNone
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "camera" => Some(EntryScreen::Camera),
            "gallery" => Some(EntryScreen::Gallery),
            "details" => Some(EntryScreen::Details),
            _ => None,
        }
    }
}

/// 起動時引数
///
/// テスト用配線を切り替えるためのフラグ群。公開CLIではなく、
/// UIテストのためのスキャフォールディング。
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// 表示するエントリ画面
    pub entry: EntryScreen,
    /// カメラ権限を許可済みとして扱うオーバーライド
    pub camera_permission_granted: bool,
    /// 詳細画面の金額を0に強制する（保存可否の検証用）
    pub amount_is_zero: bool,
    /// UIテスト用のモック配線を有効にする
    pub ui_test: bool,
}

impl LaunchOptions {
    /// 引数列から起動オプションを解析する
    ///
    /// # 引数
    /// * `args` - プログラム名を除いた引数列
    ///
    /// # 戻り値
    /// 解析された起動オプション（未知の引数は警告して無視）
    pub fn parse<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--camera-permission-granted" => options.camera_permission_granted = true,
                "--amount-is-zero" => options.amount_is_zero = true,
                "--ui-test" => options.ui_test = true,
                "--screen" => match iter.next().as_deref().and_then(EntryScreen::parse) {
                    Some(entry) => options.entry = entry,
                    None => warn!("--screen に有効な画面名が指定されていません"),
                },
                other => warn!("未知の起動引数を無視します: {other}"),
            }
        }

        options
    }

    /// プロセス引数から起動オプションを解析する
    ///
    /// # 戻り値
    /// 解析された起動オプション
    pub fn from_process_args() -> Self {
        Self::parse(std::env::args().skip(1))
    }
}
